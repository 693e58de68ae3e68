// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Immutable in-memory graph handle
//!
//! A `Graph` is the materialized view algorithms run on: a CSR adjacency
//! over dense node ids `0..node_count`, plus the projected node property
//! columns. Once built it is never mutated; catalog entries share it via
//! `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

/// Node and relationship counts handed to memory estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphDimensions {
    pub node_count: u64,
    pub relationship_count: u64,
}

/// An immutable, loaded graph.
#[derive(Debug)]
pub struct Graph {
    node_count: usize,
    /// CSR offsets, length `node_count + 1`.
    offsets: Vec<usize>,
    /// CSR targets; adjacency of node `n` is `targets[offsets[n]..offsets[n + 1]]`.
    targets: Vec<u64>,
    /// Labels present in this projection, declaration order.
    labels: Vec<String>,
    /// Relationship types present in this projection, declaration order.
    relationship_types: Vec<String>,
    properties: HashMap<String, Arc<Vec<f64>>>,
}

impl Graph {
    pub(crate) fn new(
        node_count: usize,
        offsets: Vec<usize>,
        targets: Vec<u64>,
        labels: Vec<String>,
        relationship_types: Vec<String>,
        properties: HashMap<String, Arc<Vec<f64>>>,
    ) -> Self {
        debug_assert_eq!(offsets.len(), node_count + 1);
        Self {
            node_count,
            offsets,
            targets,
            labels,
            relationship_types,
            properties,
        }
    }

    pub fn node_count(&self) -> u64 {
        self.node_count as u64
    }

    /// Number of stored adjacency entries. An undirected projection stores
    /// each input relationship in both directions and counts both.
    pub fn relationship_count(&self) -> u64 {
        self.targets.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn dimensions(&self) -> GraphDimensions {
        GraphDimensions {
            node_count: self.node_count(),
            relationship_count: self.relationship_count(),
        }
    }

    /// Out-degree of `node` under the loaded orientation.
    pub fn degree(&self, node: u64) -> u64 {
        let node = node as usize;
        (self.offsets[node + 1] - self.offsets[node]) as u64
    }

    /// Neighbors of `node` under the loaded orientation.
    pub fn neighbors(&self, node: u64) -> &[u64] {
        let node = node as usize;
        &self.targets[self.offsets[node]..self.offsets[node + 1]]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn relationship_types(&self) -> &[String] {
        &self.relationship_types
    }

    pub fn node_property(&self, property: &str) -> Option<Arc<Vec<f64>>> {
        self.properties.get(property).cloned()
    }

    /// Projected node property names, sorted for stable diagnostics.
    pub fn node_property_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.properties.keys().cloned().collect();
        keys.sort();
        keys
    }
}
