// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The fragment record — opaque payload the core index carries around but
//! never interprets beyond its identifier.

use std::time::SystemTime;

/// Globally-unique identifier for a fragment within an index.
///
/// Thin newtype over `String` (not a content hash) — fragment identity is
/// assigned by the external parser/caller, not derived from content. Unlike
/// `echo-cas::BlobHash`, two fragments with identical text but different
/// locators are different fragments.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct FragmentId(pub String);

impl FragmentId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for FragmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for FragmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The syntactic kind of a block a fragment was extracted from.
///
/// The core never branches on this value; it is opaque payload, carried
/// only so downstream report generators (outside this workspace) can
/// render it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlockKind {
    /// A free-standing function or top-level procedure.
    Function,
    /// A class, struct, or equivalent type declaration.
    Class,
    /// A method defined on a class/struct/trait impl.
    Method,
    /// Any block kind not covered by the above (parser-specific).
    Other,
}

/// Inclusive source location: a path, a 1-based inclusive line range, and a
/// 0-based column range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceLocator {
    /// Path to the source file, as reported by the parser.
    pub path: String,
    /// Inclusive start line, 1-based.
    pub start_line: u32,
    /// Inclusive end line, 1-based.
    pub end_line: u32,
    /// Start column, 0-based.
    pub start_col: u32,
    /// End column, 0-based.
    pub end_col: u32,
}

/// An opaque source-code fragment carried by the index.
///
/// Every field except [`Fragment::id`] is opaque payload to the core — only
/// the identifier participates in dedup/remove/overflow-chain decisions.
/// `normalized_text` is the one exception used operationally: `lsh-clones`'
/// Type-1 override compares it directly for exact duplicate detection,
/// independent of the embedding.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fragment {
    /// Globally-unique identifier within an index.
    pub id: FragmentId,
    /// Where this fragment came from in the original source tree.
    pub locator: SourceLocator,
    /// Parser-reported language tag (e.g. `"rust"`, `"python"`).
    pub language: String,
    /// Syntactic kind of the enclosing block.
    pub block_kind: BlockKind,
    /// Normalized text used for exact-duplicate (Type-1) detection.
    pub normalized_text: String,
    /// When this fragment was indexed, as Unix-epoch seconds.
    pub indexed_at_unix: u64,
}

impl Fragment {
    /// Convenience constructor stamping `indexed_at_unix` from the current
    /// system clock. Falls back to `0` if the clock is somehow before the
    /// epoch (a platform anomaly this module defers to rather than panics
    /// on, per the workspace's no-panic policy).
    pub fn new(
        id: FragmentId,
        locator: SourceLocator,
        language: String,
        block_kind: BlockKind,
        normalized_text: String,
    ) -> Self {
        let indexed_at_unix = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            id,
            locator,
            language,
            block_kind,
            normalized_text,
            indexed_at_unix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> SourceLocator {
        SourceLocator {
            path: "src/lib.rs".to_string(),
            start_line: 1,
            end_line: 10,
            start_col: 0,
            end_col: 1,
        }
    }

    #[test]
    fn fragment_id_display_round_trips_through_string() {
        let id = FragmentId::from("frag-001");
        assert_eq!(id.as_str(), "frag-001");
        assert_eq!(id.to_string(), "frag-001");
    }

    #[test]
    fn new_stamps_a_nonzero_timestamp() {
        let f = Fragment::new(
            FragmentId::from("a"),
            locator(),
            "rust".to_string(),
            BlockKind::Function,
            "fn a() {}".to_string(),
        );
        assert!(f.indexed_at_unix > 0);
    }
}
