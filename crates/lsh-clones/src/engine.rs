// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `query`/`query_similar` classification on top of an [`LshIndex`].

use std::time::{Duration, Instant};

use lsh_fragment::{EmbeddingVector, FragmentId};
use lsh_index::{LshIndex, QueryOptions, QueryResult};
use tracing::debug;

use crate::clone_type::{classify, CloneType, CloneTypeThresholds};
use crate::error::ClonesError;

/// Options for a classified query.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedQueryOptions {
    /// The underlying index query options.
    pub query: QueryOptions,
    /// Clone-type classification thresholds.
    pub thresholds: CloneTypeThresholds,
    /// If non-empty, only results classified into one of these types are
    /// returned. An empty vec means no filtering.
    pub allowed_types: Vec<CloneType>,
    /// For `query_similar` only: whether to include the source fragment
    /// itself in the results (it otherwise matches its own vector exactly
    /// and is filtered out).
    pub include_self: bool,
}

impl Default for ClassifiedQueryOptions {
    fn default() -> Self {
        Self {
            query: QueryOptions::default(),
            thresholds: CloneTypeThresholds::default(),
            allowed_types: Vec::new(),
            include_self: false,
        }
    }
}

/// One classified query result: the underlying hit plus its clone type.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedResult {
    /// The index's raw query result.
    pub result: QueryResult,
    /// Clone type derived from `result.ranking_similarity()`.
    pub clone_type: CloneType,
}

/// The full response to a classified query: results, total candidate
/// count, and elapsed time.
#[derive(Clone, Debug, PartialEq)]
pub struct ClonesResponse {
    /// Results surviving type filtering, already sorted by the index.
    pub results: Vec<ClassifiedResult>,
    /// Total candidates the index surfaced before type filtering.
    pub total_candidates: usize,
    /// Wall-clock time spent inside the index query.
    pub elapsed: Duration,
}

/// Wraps an [`LshIndex`] with clone-type-aware query semantics.
pub struct CloneEngine<'a> {
    pub(crate) index: &'a mut LshIndex,
}

impl<'a> CloneEngine<'a> {
    /// Wraps an existing index.
    pub fn new(index: &'a mut LshIndex) -> Self {
        Self { index }
    }

    /// Queries by an already-embedded vector, classifying each result's
    /// clone type and filtering by `opts.allowed_types`.
    ///
    /// # Errors
    ///
    /// Propagates [`lsh_index::IndexError`] from the underlying index query.
    pub fn query(&mut self, vector: &EmbeddingVector, opts: &ClassifiedQueryOptions) -> Result<ClonesResponse, ClonesError> {
        let started = Instant::now();
        let raw = self.index.query(vector, opts.query)?;
        let elapsed = started.elapsed();
        let total_candidates = raw.len();

        let results = raw
            .into_iter()
            .map(|result| {
                let clone_type = classify(result.ranking_similarity(), opts.thresholds);
                ClassifiedResult { result, clone_type }
            })
            .filter(|r| opts.allowed_types.is_empty() || opts.allowed_types.contains(&r.clone_type))
            .collect::<Vec<_>>();

        debug!(
            total_candidates,
            surfaced = results.len(),
            elapsed_us = elapsed.as_micros(),
            "classified query complete"
        );

        Ok(ClonesResponse {
            results,
            total_candidates,
            elapsed,
        })
    }

    /// Queries by the vector already stored for `fragment_id`, filtering
    /// out the source fragment unless `opts.include_self` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ClonesError::FragmentNotFound`] if `fragment_id` is not
    /// indexed, or propagates [`lsh_index::IndexError`] from the underlying query.
    pub fn query_similar(
        &mut self,
        fragment_id: &FragmentId,
        opts: &ClassifiedQueryOptions,
    ) -> Result<ClonesResponse, ClonesError> {
        let vector = self
            .index
            .get(fragment_id)
            .map(|record| record.embedding.clone())
            .ok_or(ClonesError::FragmentNotFound)?;

        let mut response = self.query(&vector, opts)?;
        if !opts.include_self {
            response.results.retain(|r| &r.result.fragment_id != fragment_id);
        }
        Ok(response)
    }
}
