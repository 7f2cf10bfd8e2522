// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Caller-visible error taxonomy for index operations.

/// Errors an [`crate::LshIndex`] operation can return.
///
/// Internal per-table outcomes (`Duplicate`, `Rejected` from
/// `lsh-store::InsertOutcome`) are not surfaced here: a duplicate insert at
/// one table is routine and handled by continuing to the next table, and a
/// fragment is only reported as a hard failure if every table rejected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// An embedding's dimension did not match the index's configured
    /// dimension.
    #[error("embedding has dimension {actual}, index expects {expected}")]
    DimensionMismatch {
        /// The index's configured dimension.
        expected: usize,
        /// The dimension of the rejected embedding.
        actual: usize,
    },
    /// Every table's bucket (primary slot and overflow chain) was full for
    /// this fragment; it could not be stored anywhere.
    #[error("fragment was rejected by every table: all buckets at capacity")]
    AllTablesRejected,
    /// `num_tables == 0` or `num_bits == 0`, which cannot form a usable
    /// index.
    #[error("index configuration is degenerate: num_tables and num_bits must both be nonzero")]
    DegenerateConfiguration,
}
