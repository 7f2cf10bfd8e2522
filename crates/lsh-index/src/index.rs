// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The core orchestration struct tying hyperplane families, the bucket
//! store, and fragment metadata into insert/query/remove.

use lsh_fragment::{EmbeddingVector, Fragment, FragmentId};
use lsh_hash::{generate_probes, HashCode, HyperplaneFamily};
use lsh_store::{BucketStore, LruTracker};
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::metadata::FragmentRecord;
use crate::query::{QueryOptions, QueryResult};
use crate::TABLE_MATCH_SAFETY_FACTOR;

/// A complete random-hyperplane LSH index: `L` independent hyperplane
/// families, an `L`-table bucket store, and the fragment metadata needed to
/// re-rank and remove.
#[derive(Debug)]
pub struct LshIndex {
    config: IndexConfig,
    families: Vec<HyperplaneFamily>,
    store: BucketStore,
    metadata: FxHashMap<FragmentId, FragmentRecord>,
    lru: LruTracker,
}

impl LshIndex {
    /// Builds a new index from `config`, constructing one hyperplane family
    /// per table deterministically from `config.table_seed(t)`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DegenerateConfiguration`] if `num_tables` or
    /// `num_bits` is zero. Propagates the underlying hyperplane construction
    /// error (dimension/bit-width validation) as [`IndexError::DimensionMismatch`]
    /// only in the degenerate case; other hyperplane errors cannot occur
    /// because [`IndexConfig::dimension`] and `num_bits` are validated here
    /// first.
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        if config.num_tables == 0 || config.num_bits == 0 {
            return Err(IndexError::DegenerateConfiguration);
        }

        let mode = config.hyperplane_mode();
        let mut families = Vec::with_capacity(config.num_tables);
        for t in 0..config.num_tables {
            let seed = config.table_seed(t);
            let family = HyperplaneFamily::new(config.num_bits, config.dimension, seed, mode)
                .map_err(|_| IndexError::DegenerateConfiguration)?;
            families.push(family);
        }

        let store = BucketStore::new(config.num_tables, config.bucket_policy(), config.analytics_enabled);

        debug!(num_tables = config.num_tables, num_bits = config.num_bits, dim = config.dimension, "index initialized");

        Ok(Self {
            config,
            families,
            store,
            metadata: FxHashMap::default(),
            lru: LruTracker::new(),
        })
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Total distinct fragments currently indexed.
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// `true` if the index holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Inserts one fragment with its embedding, hashing it into every
    /// table's bucket store.
    ///
    /// Returns the number of tables the fragment was actually stored in.
    /// A fragment rejected by every table (every bucket at capacity) is not
    /// retained in metadata and yields [`IndexError::AllTablesRejected`].
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if `embedding.dim()` does
    /// not match [`IndexConfig::dimension`], or
    /// [`IndexError::AllTablesRejected`] if no table could store it.
    pub fn insert(&mut self, fragment: Fragment, embedding: EmbeddingVector) -> Result<usize, IndexError> {
        if embedding.dim() != self.config.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: embedding.dim(),
            });
        }

        let mut codes = FxHashMap::default();
        for (table_idx, family) in self.families.iter().enumerate() {
            let code = family
                .hash(&embedding)
                .map_err(|_| IndexError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: embedding.dim(),
                })?;
            if self.store.insert(table_idx, code, fragment.clone()) {
                codes.insert(table_idx, code);
            }
        }

        if codes.is_empty() {
            warn!(fragment_id = %fragment.id, "fragment rejected by every table");
            return Err(IndexError::AllTablesRejected);
        }

        let stored_in = codes.len();
        self.lru.touch(&fragment.id);
        self.metadata
            .insert(fragment.id.clone(), FragmentRecord::new(fragment, embedding, codes));

        self.maybe_evict();
        Ok(stored_in)
    }

    /// Inserts many `(fragment, embedding)` pairs in order.
    ///
    /// Every embedding's dimension is validated up front; if any one of
    /// them mismatches [`IndexConfig::dimension`], nothing is inserted and
    /// the first mismatch is returned. Otherwise each pair is inserted in
    /// order and the number actually inserted is returned — a fragment
    /// rejected by every table does not abort the batch, it is simply not
    /// counted.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if any embedding's
    /// dimension does not match [`IndexConfig::dimension`]. In that case no
    /// fragment in the batch is inserted.
    pub fn insert_batch(
        &mut self,
        items: impl IntoIterator<Item = (Fragment, EmbeddingVector)>,
    ) -> Result<usize, IndexError> {
        let items: Vec<(Fragment, EmbeddingVector)> = items.into_iter().collect();
        for (_, embedding) in &items {
            if embedding.dim() != self.config.dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: embedding.dim(),
                });
            }
        }

        let mut inserted = 0;
        for (fragment, embedding) in items {
            match self.insert(fragment, embedding) {
                Ok(_) => inserted += 1,
                Err(IndexError::AllTablesRejected) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(inserted)
    }

    /// Removes a fragment from every table and from metadata.
    ///
    /// Returns `true` if the fragment was present and removed.
    pub fn remove(&mut self, fragment_id: &FragmentId) -> bool {
        let Some(record) = self.metadata.remove(fragment_id) else {
            return false;
        };
        self.store.remove(fragment_id, &record.codes);
        self.lru.remove(fragment_id);
        true
    }

    /// `true` if `fragment_id` is currently indexed.
    pub fn contains(&self, fragment_id: &FragmentId) -> bool {
        self.metadata.contains_key(fragment_id)
    }

    /// Direct metadata lookup, for callers (e.g. `lsh-clones`) that need the
    /// stored embedding or codes without going through a similarity query.
    pub fn get(&self, fragment_id: &FragmentId) -> Option<&FragmentRecord> {
        self.metadata.get(fragment_id)
    }

    /// All fragment ids currently indexed, in arbitrary order.
    pub fn fragment_ids(&self) -> Vec<FragmentId> {
        self.metadata.keys().cloned().collect()
    }

    /// Finds fragments similar to `query`, ranked by the better of exact
    /// cosine similarity (when requested) or the multi-table Hamming
    /// estimate.
    ///
    /// Algorithm: for each table, hash the query, generate a probe list,
    /// fetch candidates via [`BucketStore::query_all`]-style aggregation
    /// across every table's probe codes, discard anything below
    /// `min_similarity * TABLE_MATCH_SAFETY_FACTOR` as estimated from table
    /// matches, optionally compute exact cosine similarity, discard below
    /// `min_similarity` on the final ranking value, sort descending with
    /// fragment id as a deterministic tie-breaker, and truncate to
    /// `max_results`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DimensionMismatch`] if `query.dim()` does not
    /// match [`IndexConfig::dimension`].
    pub fn query(&mut self, query: &EmbeddingVector, options: QueryOptions) -> Result<Vec<QueryResult>, IndexError> {
        if query.dim() != self.config.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: query.dim(),
            });
        }

        let probe_cfg = self.config.probe_config();
        let num_tables = self.families.len();
        let mut code_lists = Vec::with_capacity(num_tables);
        for family in &self.families {
            let code = family
                .hash(query)
                .map_err(|_| IndexError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: query.dim(),
                })?;
            let probes = generate_probes(code, family.bits(), probe_cfg, Some((query, family)));
            code_lists.push(probes.into_iter().map(|p| p.code).collect::<Vec<HashCode>>());
        }

        let hits = self.store.query_all(&code_lists);
        trace!(candidates = hits.len(), "query_all returned candidates");

        let gate = options.min_similarity * TABLE_MATCH_SAFETY_FACTOR;
        let mut results = Vec::with_capacity(hits.len());

        for (fragment_id, hit) in hits {
            let estimated_similarity = hit.table_match_count as f32 / num_tables as f32;
            if estimated_similarity < gate {
                continue;
            }

            let exact_similarity = if options.compute_exact {
                self.metadata
                    .get(&fragment_id)
                    .map(|record| record.embedding.cosine_similarity_or_zero(query))
            } else {
                None
            };

            let ranking = exact_similarity.unwrap_or(estimated_similarity);
            if ranking < options.min_similarity {
                continue;
            }

            self.lru.touch(&fragment_id);
            results.push(QueryResult {
                fragment_id,
                fragment: hit.fragment,
                table_match_count: hit.table_match_count,
                estimated_similarity,
                exact_similarity,
            });
        }

        results.sort_by(|a, b| {
            b.ranking_similarity()
                .partial_cmp(&a.ranking_similarity())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fragment_id.cmp(&b.fragment_id))
        });
        results.truncate(options.max_results);

        Ok(results)
    }

    /// Runs an eviction sweep if LRU eviction is enabled and the fragment
    /// count has exceeded the configured threshold: removes the oldest
    /// `fraction` of the threshold, not of the current size, so a single
    /// over-threshold insert evicts a small, predictable batch rather than a
    /// growing one.
    fn maybe_evict(&mut self) {
        let policy = self.config.lru_eviction;
        if !policy.enabled || self.metadata.len() <= policy.threshold {
            return;
        }

        let evict_count = (((policy.threshold as f32) * policy.fraction).floor() as usize).max(1);
        let victims = self.lru.least_recently_used(evict_count);
        debug!(count = victims.len(), "evicting least-recently-used fragments");
        for victim in &victims {
            self.remove(victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsh_fragment::{BlockKind, SourceLocator};

    fn frag(id: &str) -> Fragment {
        Fragment::new(
            FragmentId::from(id),
            SourceLocator {
                path: "a.rs".into(),
                start_line: 1,
                end_line: 2,
                start_col: 0,
                end_col: 0,
            },
            "rust".into(),
            BlockKind::Function,
            format!("fn {id}() {{}}"),
        )
    }

    fn small_config() -> IndexConfig {
        IndexConfig {
            num_tables: 6,
            num_bits: 10,
            dimension: 8,
            seed: 7,
            multi_probe_enabled: true,
            num_probes: 4,
            use_scored_probes: true,
            ..IndexConfig::default()
        }
    }

    fn vec_of(components: [f32; 8]) -> EmbeddingVector {
        EmbeddingVector::new(components.to_vec())
    }

    #[test]
    fn degenerate_configuration_is_rejected() {
        let cfg = IndexConfig {
            num_tables: 0,
            ..IndexConfig::default()
        };
        assert_eq!(LshIndex::new(cfg).unwrap_err(), IndexError::DegenerateConfiguration);
    }

    #[test]
    fn insert_then_query_finds_the_exact_vector() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let v = vec_of([1.0, 0.2, -0.3, 0.4, 0.1, -0.5, 0.6, 0.0]);
        index.insert(frag("a"), v.clone()).unwrap();

        let results = index
            .query(
                &v,
                QueryOptions {
                    min_similarity: 0.5,
                    ..QueryOptions::default()
                },
            )
            .unwrap();

        assert!(results.iter().any(|r| r.fragment_id == FragmentId::from("a")));
        let hit = results.iter().find(|r| r.fragment_id == FragmentId::from("a")).unwrap();
        assert!(hit.exact_similarity.unwrap() > 0.99);
    }

    #[test]
    fn dimension_mismatch_is_rejected_on_insert_and_query() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let wrong = EmbeddingVector::new(vec![0.0; 4]);
        assert_eq!(
            index.insert(frag("a"), wrong.clone()),
            Err(IndexError::DimensionMismatch { expected: 8, actual: 4 })
        );
        assert_eq!(
            index.query(&wrong, QueryOptions::default()),
            Err(IndexError::DimensionMismatch { expected: 8, actual: 4 })
        );
    }

    #[test]
    fn remove_makes_fragment_disappear_from_queries() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let v = vec_of([1.0, 0.2, -0.3, 0.4, 0.1, -0.5, 0.6, 0.0]);
        index.insert(frag("a"), v.clone()).unwrap();
        assert!(index.remove(&FragmentId::from("a")));
        assert!(!index.contains(&FragmentId::from("a")));

        let results = index
            .query(
                &v,
                QueryOptions {
                    min_similarity: 0.0,
                    ..QueryOptions::default()
                },
            )
            .unwrap();
        assert!(!results.iter().any(|r| r.fragment_id == FragmentId::from("a")));
    }

    #[test]
    fn unrelated_vectors_are_not_returned_above_high_threshold() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let a = vec_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = vec_of([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        index.insert(frag("a"), a).unwrap();

        let results = index
            .query(
                &b,
                QueryOptions {
                    min_similarity: 0.95,
                    ..QueryOptions::default()
                },
            )
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn insert_batch_rejects_the_whole_batch_on_a_dimension_mismatch() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let items = vec![
            (frag("a"), vec_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
            (frag("b"), EmbeddingVector::new(vec![0.0; 3])),
        ];
        let result = index.insert_batch(items);
        assert!(matches!(result, Err(IndexError::DimensionMismatch { .. })));
        assert!(index.is_empty(), "a rejected batch must not insert any fragment");
    }

    #[test]
    fn insert_batch_inserts_in_order_and_returns_the_inserted_count() {
        let mut index = LshIndex::new(small_config()).unwrap();
        let items = vec![
            (frag("a"), vec_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
            (frag("b"), vec_of([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
        ];
        let inserted = index.insert_batch(items).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(index.len(), 2);
        assert!(index.contains(&FragmentId::from("a")));
        assert!(index.contains(&FragmentId::from("b")));
    }

    #[test]
    fn len_and_is_empty_track_distinct_fragments() {
        let mut index = LshIndex::new(small_config()).unwrap();
        assert!(index.is_empty());
        index
            .insert(frag("a"), vec_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn lru_eviction_sweeps_oldest_fragment_once_threshold_is_exceeded() {
        // lru_threshold=3, fraction=0.5, insert A,B,C,D in order. After D,
        // size <= 3, A is evicted, B/C/D remain.
        let mut cfg = small_config();
        cfg.lru_eviction = crate::config::LruEvictionConfig {
            enabled: true,
            threshold: 3,
            fraction: 0.5,
        };
        let mut index = LshIndex::new(cfg).unwrap();
        for (i, id) in ["a", "b", "c"].into_iter().enumerate() {
            let mut v = [0.0f32; 8];
            v[i % 8] = 1.0;
            index.insert(frag(id), vec_of(v)).unwrap();
        }
        assert_eq!(index.len(), 3, "no eviction yet: size has only reached the threshold");

        let mut v = [0.0f32; 8];
        v[3 % 8] = 1.0;
        index.insert(frag("d"), vec_of(v)).unwrap();

        assert!(index.len() <= 3);
        assert!(!index.contains(&FragmentId::from("a")), "a was never re-touched and should be evicted");
        assert!(index.contains(&FragmentId::from("b")));
        assert!(index.contains(&FragmentId::from("c")));
        assert!(index.contains(&FragmentId::from("d")));
    }
}
