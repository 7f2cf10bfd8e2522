// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Errors surfaced by the clone-detection query and clustering layer.

/// Errors that can occur while classifying queries or clustering clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClonesError {
    /// The underlying index rejected the operation (dimension mismatch,
    /// degenerate configuration, etc).
    #[error("index operation failed: {0}")]
    Index(#[from] lsh_index::IndexError),
    /// `query_similar`/clustering referenced a fragment id not present in
    /// the index.
    #[error("fragment id not found in index")]
    FragmentNotFound,
}
