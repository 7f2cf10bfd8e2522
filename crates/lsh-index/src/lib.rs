// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! LSH index orchestration: insert, query, remove, and cosine re-ranking
//! over an [`lsh_store::BucketStore`] hashed by an [`lsh_hash::HyperplaneFamily`]
//! per table.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self,
    clippy::similar_names
)]

mod concurrency;
mod config;
mod error;
mod index;
mod metadata;
mod query;

pub use concurrency::ConcurrentIndex;
pub use config::{IndexConfig, LruEvictionConfig};
pub use error::IndexError;
pub use index::LshIndex;
pub use metadata::FragmentRecord;
pub use query::{QueryOptions, QueryResult};

/// Safety margin applied to the table-match gate before exact cosine
/// re-ranking: candidates below `min_similarity * TABLE_MATCH_SAFETY_FACTOR`
/// in estimated similarity are discarded before the expensive cosine
/// computation runs. The factor of 2 (expressed here as its reciprocal, 0.5)
/// is unexplained in the originating system and preserved for fidelity, not
/// derived.
pub const TABLE_MATCH_SAFETY_FACTOR: f32 = 0.5;
