// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A single hash table: code → bucket, plus optional collision analytics.

use lsh_fragment::Fragment;
use lsh_hash::HashCode;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::bucket::{Bucket, BucketPolicy};

/// Outcome of a single-table insert attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The fragment was stored.
    Inserted,
    /// A fragment with this id already occupied the bucket's chain; no-op.
    Duplicate,
    /// The bucket's primary slot and overflow chain were both full.
    Rejected,
}

/// Per-primary-bucket counters, maintained only when analytics are
/// enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketAnalytics {
    /// Hash code this record describes.
    pub code: u64,
    /// Total insertion attempts seen at this bucket.
    pub insertion_attempts: u64,
    /// Attempts that landed on an already-occupied primary (collisions).
    pub collisions: u64,
    /// Number of `get` calls that resolved to this bucket.
    pub accesses: u64,
}

impl BucketAnalytics {
    fn hot_score(self) -> u64 {
        self.collisions + self.accesses
    }
}

/// One of the `L` independent hash tables.
#[derive(Debug, Clone)]
pub struct HashTable {
    policy: BucketPolicy,
    analytics_enabled: bool,
    buckets: FxHashMap<u64, Bucket>,
    stats: FxHashMap<u64, BucketAnalytics>,
}

impl HashTable {
    /// Creates an empty table with the given bucket policy.
    pub fn new(policy: BucketPolicy, analytics_enabled: bool) -> Self {
        Self {
            policy,
            analytics_enabled,
            buckets: FxHashMap::default(),
            stats: FxHashMap::default(),
        }
    }

    /// Number of occupied codes (buckets with at least one fragment).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total fragments stored in this table.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }

    /// `true` if this table holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn record_attempt(&mut self, code: HashCode, collided: bool) {
        if !self.analytics_enabled {
            return;
        }
        let entry = self.stats.entry(code.value()).or_insert(BucketAnalytics {
            code: code.value(),
            ..BucketAnalytics::default()
        });
        entry.insertion_attempts += 1;
        if collided {
            entry.collisions += 1;
        }
    }

    fn record_access(&mut self, code: HashCode) {
        if !self.analytics_enabled {
            return;
        }
        let entry = self.stats.entry(code.value()).or_insert(BucketAnalytics {
            code: code.value(),
            ..BucketAnalytics::default()
        });
        entry.accesses += 1;
    }

    /// Attempts to insert `frag` at `code`: duplicate check across the
    /// whole chain first, then primary, then overflow slots in order, then
    /// a new overflow link if room remains.
    pub fn insert(&mut self, code: HashCode, frag: Fragment) -> InsertOutcome {
        let bucket = self.buckets.entry(code.value()).or_default();
        let occupied_before = !bucket.is_empty();

        if bucket.contains_id(frag.id.as_str()) {
            return InsertOutcome::Duplicate;
        }

        let frag_id = frag.id.clone();
        let inserted = bucket.insert(frag, self.policy);
        self.record_attempt(code, occupied_before);

        if inserted {
            InsertOutcome::Inserted
        } else {
            warn!(fragment_id = %frag_id, code = code.value(), "bucket and overflow chain full, rejecting insert");
            InsertOutcome::Rejected
        }
    }

    /// Fragments stored at `code`, in bucket order (primary, then overflow
    /// in chain order). Empty if the code has no bucket.
    pub fn get(&mut self, code: HashCode) -> Vec<Fragment> {
        self.record_access(code);
        self.buckets
            .get(&code.value())
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Like [`HashTable::get`] but without mutating access analytics —
    /// used internally when the caller will already record an access
    /// through another path (e.g. multi-code fan-out).
    pub fn peek(&self, code: HashCode) -> Vec<Fragment> {
        self.buckets
            .get(&code.value())
            .map(|b| b.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Deduplicated union of fragments across several codes.
    pub fn get_multi(&mut self, codes: &[HashCode]) -> Vec<Fragment> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for &code in codes {
            for frag in self.get(code) {
                if seen.insert(frag.id.clone()) {
                    out.push(frag);
                }
            }
        }
        out
    }

    /// Removes the fragment `frag_id` from `code`'s bucket, if present.
    /// Erases the bucket entirely if it becomes empty.
    pub fn remove(&mut self, code: HashCode, frag_id: &str) -> bool {
        let Some(bucket) = self.buckets.get_mut(&code.value()) else {
            return false;
        };
        let removed = bucket.remove(frag_id);
        if bucket.is_empty() {
            self.buckets.remove(&code.value());
        }
        removed
    }

    /// `true` if `frag_id` is present at `code`.
    pub fn has(&self, code: HashCode, frag_id: &str) -> bool {
        self.buckets
            .get(&code.value())
            .is_some_and(|b| b.contains_id(frag_id))
    }

    /// One analytics record per bucket that has seen at least one
    /// insertion attempt. Empty if analytics are disabled.
    pub fn collision_analytics(&self) -> Vec<BucketAnalytics> {
        self.stats.values().copied().collect()
    }

    /// The `n` buckets with the highest `collisions + accesses` score.
    pub fn hot_spots(&self, n: usize) -> Vec<BucketAnalytics> {
        let mut all: Vec<BucketAnalytics> = self.stats.values().copied().collect();
        all.sort_by(|a, b| b.hot_score().cmp(&a.hot_score()));
        all.truncate(n);
        all
    }
}
