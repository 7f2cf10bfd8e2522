// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Clone-type classification and union-find clustering on top of
//! [`lsh_index::LshIndex`].
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

mod clone_type;
mod clusters;
mod engine;
mod error;
mod union_find;

pub use clone_type::{classify, CloneType, CloneTypeThresholds};
pub use clusters::{Cluster, FindAllClonesOptions};
pub use engine::{ClassifiedQueryOptions, ClassifiedResult, CloneEngine, ClonesResponse};
pub use error::ClonesError;
