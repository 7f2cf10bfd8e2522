// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared data model for the clone-detection LSH index.
//!
//! `lsh-fragment` has no opinions about hashing, storage, or querying — it
//! only defines the [`Fragment`] record that flows through every other
//! crate in the workspace, plus the [`EmbeddingVector`] newtype and the
//! locator/identifier types that make up its opaque payload.
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

mod embedding;
mod fragment;

pub use embedding::{dot_unrolled, CosineError, EmbeddingVector};
pub use fragment::{BlockKind, Fragment, FragmentId, SourceLocator};
