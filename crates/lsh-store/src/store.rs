// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `L` independent hash tables plus the global fragment → tables reverse
//! map.

use lsh_fragment::{Fragment, FragmentId};
use lsh_hash::HashCode;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bucket::BucketPolicy;
use crate::table::{BucketAnalytics, HashTable, InsertOutcome};

/// One candidate surfaced by [`BucketStore::query_all`]: the fragment
/// payload (taken from the first table that found it) and the count of
/// distinct tables it matched in — the raw input to the LSH index's
/// `estimated_similarity = table_matches / L` ranking.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// The fragment payload.
    pub fragment: Fragment,
    /// Number of distinct tables in which this fragment was found.
    pub table_match_count: usize,
}

/// `L` independent [`HashTable`]s plus the `frag_id -> {table_idx}` reverse
/// map that keeps `query_all` and `remove` correct.
#[derive(Debug, Clone)]
pub struct BucketStore {
    tables: Vec<HashTable>,
    reverse: FxHashMap<FragmentId, std::collections::BTreeSet<usize>>,
}

impl BucketStore {
    /// Creates `num_tables` empty tables sharing one bucket policy.
    pub fn new(num_tables: usize, policy: BucketPolicy, analytics_enabled: bool) -> Self {
        Self {
            tables: (0..num_tables)
                .map(|_| HashTable::new(policy, analytics_enabled))
                .collect(),
            reverse: FxHashMap::default(),
        }
    }

    /// Number of tables (`L`).
    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Read-only access to one table, for diagnostics/persistence.
    pub fn table(&self, idx: usize) -> Option<&HashTable> {
        self.tables.get(idx)
    }

    /// Inserts `frag` at `code` in table `table_idx`. Returns `true` only on
    /// [`InsertOutcome::Inserted`] — `Duplicate` and `Rejected` both return
    /// `false` (the richer outcome is available via the table directly when
    /// a caller needs it).
    pub fn insert(&mut self, table_idx: usize, code: HashCode, frag: Fragment) -> bool {
        let Some(table) = self.tables.get_mut(table_idx) else {
            return false;
        };
        let id = frag.id.clone();
        match table.insert(code, frag) {
            InsertOutcome::Inserted => {
                self.reverse.entry(id).or_default().insert(table_idx);
                true
            }
            InsertOutcome::Duplicate => {
                self.reverse.entry(id).or_default().insert(table_idx);
                false
            }
            InsertOutcome::Rejected => false,
        }
    }

    /// Deduplicated fan-out of `HashTable::get_multi` over one table.
    pub fn query(&mut self, table_idx: usize, codes: &[HashCode]) -> Vec<Fragment> {
        self.tables
            .get_mut(table_idx)
            .map(|t| t.get_multi(codes))
            .unwrap_or_default()
    }

    /// For each table index, retrieves fragments matching any of its
    /// provided codes, and returns a map of `frag_id -> QueryHit` carrying
    /// the number of distinct tables each fragment matched in — the key
    /// primitive for LSH querying.
    pub fn query_all(&mut self, code_lists_per_table: &[Vec<HashCode>]) -> FxHashMap<FragmentId, QueryHit> {
        let mut hits: FxHashMap<FragmentId, QueryHit> = FxHashMap::default();

        for (table_idx, codes) in code_lists_per_table.iter().enumerate() {
            if codes.is_empty() {
                continue;
            }
            let found = self.query(table_idx, codes);
            for fragment in found {
                hits.entry(fragment.id.clone())
                    .and_modify(|hit| hit.table_match_count += 1)
                    .or_insert_with(|| QueryHit {
                        fragment,
                        table_match_count: 1,
                    });
            }
        }

        hits
    }

    /// Removes `frag_id` from every `(table_idx, code)` pair supplied by
    /// the caller (typically the index's per-fragment code map). Returns
    /// the number of tables from which it was actually removed.
    pub fn remove(&mut self, frag_id: &FragmentId, codes: &FxHashMap<usize, HashCode>) -> usize {
        let mut removed = 0usize;
        for (&table_idx, &code) in codes {
            if let Some(table) = self.tables.get_mut(table_idx) {
                if table.remove(code, frag_id.as_str()) {
                    removed += 1;
                }
            }
        }
        if let Some(set) = self.reverse.get_mut(frag_id) {
            for &table_idx in codes.keys() {
                set.remove(&table_idx);
            }
            if set.is_empty() {
                self.reverse.remove(frag_id);
            }
        }
        debug!(fragment_id = %frag_id, removed_from_tables = removed, "removed fragment from bucket store");
        removed
    }

    /// `true` if `frag_id` is present in at least one table.
    pub fn has(&self, frag_id: &FragmentId) -> bool {
        self.reverse.get(frag_id).is_some_and(|s| !s.is_empty())
    }

    /// The set of table indices `frag_id` is currently stored in.
    pub fn tables_for(&self, frag_id: &FragmentId) -> Vec<usize> {
        self.reverse
            .get(frag_id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total distinct fragments tracked across all tables.
    pub fn size(&self) -> usize {
        self.reverse.len()
    }

    /// Per-table fragment counts, in table order.
    pub fn per_table_sizes(&self) -> Vec<usize> {
        self.tables.iter().map(HashTable::len).collect()
    }

    /// Collision analytics for table `table_idx`, if it exists.
    pub fn collision_analytics(&self, table_idx: usize) -> Vec<BucketAnalytics> {
        self.tables
            .get(table_idx)
            .map(HashTable::collision_analytics)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsh_fragment::{BlockKind, FragmentId, SourceLocator};

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

    fn store(l: usize) -> BucketStore {
        BucketStore::new(l, BucketPolicy::default(), false)
    }

    #[test]
    fn insert_and_tables_for_agree() {
        let mut s = store(3);
        s.insert(0, HashCode(1), frag("a"));
        s.insert(2, HashCode(5), frag("a"));
        let mut tables = s.tables_for(&FragmentId::from("a"));
        tables.sort_unstable();
        assert_eq!(tables, vec![0, 2]);
        assert!(s.has(&FragmentId::from("a")));
    }

    #[test]
    fn query_all_counts_distinct_table_matches() {
        let mut s = store(3);
        s.insert(0, HashCode(1), frag("a"));
        s.insert(1, HashCode(1), frag("a"));
        s.insert(2, HashCode(9), frag("b"));

        let lists = vec![vec![HashCode(1)], vec![HashCode(1)], vec![HashCode(9)]];
        let hits = s.query_all(&lists);

        assert_eq!(hits[&FragmentId::from("a")].table_match_count, 2);
        assert_eq!(hits[&FragmentId::from("b")].table_match_count, 1);
    }

    #[test]
    fn remove_clears_reverse_map_entry_when_last_table_gone() {
        let mut s = store(2);
        s.insert(0, HashCode(1), frag("a"));
        s.insert(1, HashCode(2), frag("a"));

        let mut codes = FxHashMap::default();
        codes.insert(0, HashCode(1));
        codes.insert(1, HashCode(2));

        let removed = s.remove(&FragmentId::from("a"), &codes);
        assert_eq!(removed, 2);
        assert!(!s.has(&FragmentId::from("a")));
        assert_eq!(s.size(), 0);
    }

    #[test]
    fn size_counts_distinct_fragments_not_table_entries() {
        let mut s = store(3);
        s.insert(0, HashCode(1), frag("a"));
        s.insert(1, HashCode(1), frag("a"));
        s.insert(2, HashCode(1), frag("a"));
        assert_eq!(s.size(), 1);
    }

    #[test]
    fn per_table_sizes_reports_each_table_independently() {
        let mut s = store(2);
        s.insert(0, HashCode(1), frag("a"));
        s.insert(0, HashCode(1), frag("b"));
        assert_eq!(s.per_table_sizes(), vec![2, 0]);
    }
}
