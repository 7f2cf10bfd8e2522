// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Random-hyperplane LSH: hyperplane families, vector hashing, and
//! multi-probe candidate generation.
//!
//! # Determinism
//!
//! Every public construction here is seeded and reproducible: the same
//! `(seed, dim, bits, mode)` always yields the same hyperplane family, on
//! any platform, because [`prng::Prng`] uses a fixed-point integer PRNG
//! (xoroshiro128+ seeded via SplitMix64) instead of any platform or OS
//! source of randomness. Persisted hyperplane seeds depend on this staying
//! true across releases.
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

mod code;
mod hyperplane;
mod probe;
mod prng;

pub use code::{hamming_distance, estimated_cosine_from_hamming, HashCode};
pub use hyperplane::{HyperplaneError, HyperplaneFamily, HyperplaneMode, ProjectionQuality};
pub use probe::{generate_probes, Probe, ProbeConfig};

/// Maximum bit width a hash code may take. Persisted codes remain decimal
/// strings for forward compatibility even though the in-memory
/// representation is a `u64`.
pub const MAX_BITS: u32 = 64;
