// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bucketed hash-table storage backing the LSH index.
//!
//! Three layers, leaves first: [`Bucket`] (one code's primary slot plus its
//! overflow chain), [`HashTable`] (one of the `L` independent tables, plus
//! its optional collision analytics), and [`BucketStore`] (all `L` tables
//! plus the global fragment-to-table reverse map that makes `query_all`
//! possible).
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

mod bucket;
mod lru;
mod store;
mod table;

pub use bucket::{Bucket, BucketPolicy};
pub use lru::LruTracker;
pub use store::{BucketStore, QueryHit};
pub use table::{BucketAnalytics, HashTable, InsertOutcome};
