// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-fragment metadata entry.

use lsh_fragment::{EmbeddingVector, Fragment};
use lsh_hash::HashCode;
use rustc_hash::FxHashMap;

/// One entry in the index's global fragment metadata map: the fragment
/// payload, its embedding, and the exact code it hashed to in every table it
/// was stored in. Needed to remove a fragment (codes must be recomputed or
/// recalled, never re-derived from a potentially-changed embedding) and to
/// re-rank query candidates by exact cosine similarity.
#[derive(Clone, Debug)]
pub struct FragmentRecord {
    /// The fragment payload.
    pub fragment: Fragment,
    /// The embedding this fragment was indexed with.
    pub embedding: EmbeddingVector,
    /// `table_idx -> code` for every table this fragment was successfully
    /// stored in.
    pub codes: FxHashMap<usize, HashCode>,
}

impl FragmentRecord {
    /// Builds a record from a fragment, its embedding, and the per-table
    /// codes it was actually stored under.
    pub fn new(fragment: Fragment, embedding: EmbeddingVector, codes: FxHashMap<usize, HashCode>) -> Self {
        Self {
            fragment,
            embedding,
            codes,
        }
    }
}
