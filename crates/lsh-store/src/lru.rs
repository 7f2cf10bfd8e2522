// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Optional LRU shadow state: per-fragment last-access bookkeeping and a
//! global recency order. Never affects query correctness — only which
//! fragments survive an eviction sweep.

use lsh_fragment::FragmentId;
use rustc_hash::FxHashMap;

/// Tracks access recency and frequency for fragments stored in an index.
///
/// Individual tables never evict on their own; this tracker is consulted
/// by `lsh-index` to decide *which* fragments to evict once a global
/// threshold is reached.
#[derive(Debug, Clone, Default)]
pub struct LruTracker {
    access_counts: FxHashMap<FragmentId, u64>,
    // Most-recent last. Touching a present id removes its old position
    // before re-appending, so this always reflects true recency order.
    order: Vec<FragmentId>,
}

impl LruTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access (insert or successful `get`) for `id`, making it
    /// the most-recently-used entry and incrementing its access count.
    pub fn touch(&mut self, id: &FragmentId) {
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        self.order.push(id.clone());
        *self.access_counts.entry(id.clone()).or_insert(0) += 1;
    }

    /// Removes all bookkeeping for `id` (called when a fragment is removed
    /// from the index).
    pub fn remove(&mut self, id: &FragmentId) {
        if let Some(pos) = self.order.iter().position(|x| x == id) {
            self.order.remove(pos);
        }
        self.access_counts.remove(id);
    }

    /// Number of fragments currently tracked.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` if no fragments are tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Access count recorded for `id`, or `0` if untracked.
    pub fn access_count(&self, id: &FragmentId) -> u64 {
        self.access_counts.get(id).copied().unwrap_or(0)
    }

    /// The `count` least-recently-used ids, oldest first.
    pub fn least_recently_used(&self, count: usize) -> Vec<FragmentId> {
        self.order.iter().take(count).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> FragmentId {
        FragmentId::from(s)
    }

    #[test]
    fn touch_moves_id_to_most_recent() {
        let mut lru = LruTracker::new();
        lru.touch(&id("a"));
        lru.touch(&id("b"));
        lru.touch(&id("a"));
        assert_eq!(lru.least_recently_used(2), vec![id("b"), id("a")]);
    }

    #[test]
    fn access_count_increments_on_repeat_touch() {
        let mut lru = LruTracker::new();
        lru.touch(&id("a"));
        lru.touch(&id("a"));
        lru.touch(&id("a"));
        assert_eq!(lru.access_count(&id("a")), 3);
    }

    #[test]
    fn remove_clears_tracking() {
        let mut lru = LruTracker::new();
        lru.touch(&id("a"));
        lru.remove(&id("a"));
        assert_eq!(lru.access_count(&id("a")), 0);
        assert!(lru.is_empty());
    }

    #[test]
    fn least_recently_used_returns_oldest_first() {
        let mut lru = LruTracker::new();
        lru.touch(&id("a"));
        lru.touch(&id("b"));
        lru.touch(&id("c"));
        assert_eq!(lru.least_recently_used(2), vec![id("a"), id("b")]);
    }
}
