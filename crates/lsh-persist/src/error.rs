// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error taxonomy for persistence: I/O and serialization failures surface
//! as-is, while any inconsistency detected in the persisted records itself
//! surfaces as `InvalidState`.

/// Errors returned by [`crate::KvStore`] implementations and by
/// [`crate::save_index`]/[`crate::load_index`].
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Underlying I/O failure.
    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("persistence serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// On-disk records were inconsistent: mismatched version, unparseable
    /// codes, or a structural shape the loader does not recognize. The
    /// index rejects the load and is left empty.
    #[error("invalid persisted state: {0}")]
    InvalidState(String),
}
