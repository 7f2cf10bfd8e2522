// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `find_all_clones`: union-find based all-pairs clustering.

use rustc_hash::FxHashMap;

use lsh_fragment::FragmentId;
use lsh_index::QueryOptions;

use crate::clone_type::{classify, CloneType, CloneTypeThresholds};
use crate::engine::CloneEngine;
use crate::error::ClonesError;
use crate::union_find::UnionFind;

/// Options controlling [`CloneEngine::find_all_clones`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FindAllClonesOptions {
    /// Minimum exact cosine similarity for two fragments to be unioned.
    pub min_similarity: f32,
    /// Clone-type classification thresholds applied to each cluster's
    /// average similarity.
    pub thresholds: CloneTypeThresholds,
}

impl Default for FindAllClonesOptions {
    fn default() -> Self {
        Self {
            min_similarity: 0.85,
            thresholds: CloneTypeThresholds::default(),
        }
    }
}

/// One cluster of mutually-similar fragments (size ≥ 2).
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    /// Members of this cluster, in no particular order.
    pub members: Vec<FragmentId>,
    /// Mean of the recorded pairwise similarities whose union landed in
    /// this cluster.
    pub avg_similarity: f32,
    /// Clone type derived from `avg_similarity`.
    pub clone_type: CloneType,
}

struct RecordedPair {
    a: FragmentId,
    b: FragmentId,
    similarity: f32,
}

impl<'a> CloneEngine<'a> {
    /// Finds clusters of ≥2 mutually-similar fragments across the whole
    /// index:
    ///
    /// 1. For each indexed fragment `F`, query its own stored vector and
    ///    skip `F` itself in the results.
    /// 2. Union `F` with every surviving candidate `G` whose exact
    ///    similarity is ≥ `opts.min_similarity`, recording the pair for
    ///    later averaging.
    /// 3. Group by union-find root; drop groups of size 1.
    /// 4. `avg_similarity` is the mean of the recorded pair similarities
    ///    whose source root is that cluster; the cluster's clone type is
    ///    classified from it.
    /// 5. Sort by descending size, then descending `avg_similarity`, then
    ///    ascending smallest-member id.
    ///
    /// A Type-1 content-hash override is applied here, per-pair, before the
    /// generic threshold classification: two fragments with identical
    /// `normalized_text` are treated as similarity `1.0` for unioning
    /// purposes regardless of their cosine score. This override applies
    /// only to this pairwise path, not to [`CloneEngine::query`]/
    /// `query_similar` — clustering cares about equivalence-class
    /// membership, not ranked similarity, so the two deliberately disagree
    /// on identical-text fragments.
    ///
    /// # Errors
    ///
    /// Propagates [`lsh_index::IndexError`] from any underlying per-fragment
    /// query.
    pub fn find_all_clones(&mut self, opts: FindAllClonesOptions) -> Result<Vec<Cluster>, ClonesError> {
        let fragment_ids = self.index.fragment_ids();
        let mut uf = UnionFind::new();
        let mut pairs: Vec<RecordedPair> = Vec::new();

        for fragment_id in &fragment_ids {
            uf.register(fragment_id);

            let Some(record) = self.index.get(fragment_id) else {
                continue;
            };
            let source_text = record.fragment.normalized_text.clone();
            let vector = record.embedding.clone();

            let query_opts = QueryOptions {
                min_similarity: opts.min_similarity,
                max_results: 50,
                compute_exact: true,
            };
            let results = self.index.query(&vector, query_opts)?;

            for candidate in results {
                if &candidate.fragment_id == fragment_id {
                    continue;
                }
                let Some(exact) = candidate.exact_similarity else {
                    continue;
                };

                let content_identical = candidate.fragment.normalized_text == source_text;
                let similarity = if content_identical { 1.0 } else { exact };

                if similarity >= opts.min_similarity {
                    uf.union(fragment_id, &candidate.fragment_id);
                    pairs.push(RecordedPair {
                        a: fragment_id.clone(),
                        b: candidate.fragment_id.clone(),
                        similarity,
                    });
                }
            }
        }

        let groups = uf.groups();
        let mut root_of: FxHashMap<FragmentId, FragmentId> = FxHashMap::default();
        for (root, members) in &groups {
            for member in members {
                root_of.insert(member.clone(), root.clone());
            }
        }

        let mut pair_sums: FxHashMap<FragmentId, (f32, usize)> = FxHashMap::default();
        for pair in &pairs {
            let Some(root) = root_of.get(&pair.a) else {
                continue;
            };
            let entry = pair_sums.entry(root.clone()).or_insert((0.0, 0));
            entry.0 += pair.similarity;
            entry.1 += 1;
        }

        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|(root, mut members)| {
                members.sort();
                let (sum, count) = pair_sums.get(&root).copied().unwrap_or((0.0, 0));
                let avg_similarity = if count == 0 { 0.0 } else { sum / count as f32 };
                let clone_type = classify(avg_similarity, opts.thresholds);
                Cluster {
                    members,
                    avg_similarity,
                    clone_type,
                }
            })
            .collect();

        clusters.sort_by(|a, b| {
            b.members
                .len()
                .cmp(&a.members.len())
                .then_with(|| b.avg_similarity.partial_cmp(&a.avg_similarity).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| a.members[0].cmp(&b.members[0]))
        });

        Ok(clusters)
    }
}
