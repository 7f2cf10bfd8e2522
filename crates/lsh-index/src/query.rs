// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Query request/response types.

use lsh_fragment::{Fragment, FragmentId};

/// Per-query overrides for the index defaults configured in
/// [`crate::IndexConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryOptions {
    /// Maximum number of results to return, after sorting.
    pub max_results: usize,
    /// Minimum similarity (estimated or exact) a candidate must clear.
    pub min_similarity: f32,
    /// Whether to compute exact cosine similarity for surviving candidates.
    /// When `false`, results are ranked by the multi-table estimate alone.
    pub compute_exact: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_results: 50,
            min_similarity: 0.7,
            compute_exact: true,
        }
    }
}

/// One ranked candidate returned by [`crate::LshIndex::query`].
#[derive(Clone, Debug, PartialEq)]
pub struct QueryResult {
    /// The fragment id of the matching candidate.
    pub fragment_id: FragmentId,
    /// The candidate fragment itself.
    pub fragment: Fragment,
    /// Number of distinct tables this candidate matched in.
    pub table_match_count: usize,
    /// `table_match_count / num_tables` — the cheap pre-rank estimate.
    pub estimated_similarity: f32,
    /// Exact cosine similarity, if [`QueryOptions::compute_exact`] was set.
    pub exact_similarity: Option<f32>,
}

impl QueryResult {
    /// The similarity value results are ranked by: exact when present,
    /// otherwise the multi-table estimate.
    pub fn ranking_similarity(&self) -> f32 {
        self.exact_similarity.unwrap_or(self.estimated_similarity)
    }
}
