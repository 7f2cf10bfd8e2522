// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Disjoint-set union with union-by-rank and path compression, keyed by
//! [`lsh_fragment::FragmentId`] rather than a dense integer range since the
//! clustering population is whatever the caller indexed.

use lsh_fragment::FragmentId;
use rustc_hash::FxHashMap;

/// A union-find over an arbitrary, grow-as-you-go population of fragment
/// ids.
#[derive(Debug, Default)]
pub(crate) struct UnionFind {
    index_of: FxHashMap<FragmentId, usize>,
    ids: Vec<FragmentId>,
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn index_for(&mut self, id: &FragmentId) -> usize {
        if let Some(&idx) = self.index_of.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.clone());
        self.parent.push(idx);
        self.rank.push(0);
        self.index_of.insert(id.clone(), idx);
        idx
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    /// Unions the sets containing `a` and `b`, registering either id if
    /// this is its first appearance.
    pub(crate) fn union(&mut self, a: &FragmentId, b: &FragmentId) {
        let ia = self.index_for(a);
        let ib = self.index_for(b);
        let ra = self.find(ia);
        let rb = self.find(ib);
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
    }

    /// Ensures `id` participates in the structure even if it never unions
    /// with anything (so singleton fragments are still discoverable and
    /// correctly dropped as size-1 groups).
    pub(crate) fn register(&mut self, id: &FragmentId) {
        let _ = self.index_for(id);
    }

    /// Groups every registered id by its root representative.
    pub(crate) fn groups(&mut self) -> FxHashMap<FragmentId, Vec<FragmentId>> {
        let mut out: FxHashMap<FragmentId, Vec<FragmentId>> = FxHashMap::default();
        for i in 0..self.ids.len() {
            let root_idx = self.find(i);
            let root_id = self.ids[root_idx].clone();
            out.entry(root_id).or_default().push(self.ids[i].clone());
        }
        out
    }
}
