// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Disjoint-set structure (union-find)
//!
//! Array-backed forest over a fixed universe of node ids `0..size`, used by
//! connectivity and community algorithms to track component membership.
//! `find` applies path halving, `union` is union-by-rank with a fixed
//! tie-break (equal ranks attach the higher root under the lower one), so
//! reported set ids are reproducible for a given union order.
//!
//! The structure is not synchronized; concurrent use requires the caller
//! to shard updates and merge partial structures afterwards.

/// Union-find over `0..size`. Out-of-range ids are a programming error and
/// panic via the underlying slice indexing.
#[derive(Debug, Clone)]
pub struct DisjointSetStruct {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSetStruct {
    /// Creates `size` singleton sets.
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    pub fn size(&self) -> usize {
        self.parent.len()
    }

    /// Representative of the set containing `node`, compressing the
    /// traversed path. Idempotent on a settled structure.
    pub fn find(&mut self, node: usize) -> usize {
        let mut node = node;
        while self.parent[node] != node {
            // path halving: point at the grandparent while walking up
            let grandparent = self.parent[self.parent[node]];
            self.parent[node] = grandparent;
            node = grandparent;
        }
        node
    }

    /// Read-only find for settled structures; does not compress.
    pub fn find_no_compress(&self, node: usize) -> usize {
        let mut node = node;
        while self.parent[node] != node {
            node = self.parent[node];
        }
        node
    }

    /// The externally reported set id of `node`. This is a representative
    /// node id, not a dense index; consumers must not assume contiguity.
    pub fn set_id_of(&mut self, node: usize) -> usize {
        self.find(node)
    }

    /// Merges the sets containing `a` and `b`. Returns `false` if they were
    /// already the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }
        let (winner, loser) = match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Greater => (root_a, root_b),
            std::cmp::Ordering::Less => (root_b, root_a),
            // deterministic tie-break: the lower root id wins
            std::cmp::Ordering::Equal => {
                let (winner, loser) = if root_a < root_b {
                    (root_a, root_b)
                } else {
                    (root_b, root_a)
                };
                self.rank[winner] += 1;
                (winner, loser)
            }
        };
        self.parent[loser] = winner;
        true
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Folds another structure over the same universe into this one by
    /// unioning each node with its representative there. Used to merge
    /// per-shard partial results.
    pub fn merge(&mut self, other: &DisjointSetStruct) {
        assert_eq!(
            self.size(),
            other.size(),
            "cannot merge structures over different universes"
        );
        for node in 0..other.size() {
            let root = other.find_no_compress(node);
            if root != node {
                self.union(node, root);
            }
        }
    }

    /// Number of distinct sets.
    pub fn set_count(&mut self) -> usize {
        (0..self.size()).filter(|&n| self.find(n) == n).count()
    }
}
