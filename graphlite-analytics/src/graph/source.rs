// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph source seam
//!
//! The property-graph storage engine is an external collaborator. The
//! pipeline only depends on the `GraphSource` trait: enough surface to
//! enumerate nodes and relationships under a projection, read node property
//! columns, and persist algorithm results. `MemoryGraphSource` is the
//! bundled in-memory implementation used by tests and embedded workloads.

use super::projection::ElementSelector;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by property reads and write-back on a graph source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Node properties not found: {}", .0.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", "))]
    PropertiesNotFound(Vec<String>),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A relationship as exposed by a source: directed, typed, unweighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRelationship {
    pub source: u64,
    pub target: u64,
}

/// Read/write surface of the underlying property graph store.
///
/// Implementations must be safe to share across the worker threads of a
/// single invocation; the pipeline never calls mutating methods
/// concurrently with reads of the same property.
pub trait GraphSource: Send + Sync {
    fn node_count(&self) -> u64;

    /// Every node label present in the store, in first-seen order.
    fn node_labels(&self) -> Vec<String>;

    /// Every relationship type present in the store, in first-seen order.
    fn relationship_types(&self) -> Vec<String>;

    /// Labels attached to one node.
    fn labels_of(&self, node_id: u64) -> Vec<String>;

    /// All relationships whose type matches the selector, in insertion
    /// order. Orientation is applied later by the loader.
    fn relationships(&self, selector: &ElementSelector) -> Vec<SourceRelationship>;

    /// Property column for every node, `None` if the property is unknown.
    fn node_property(&self, property: &str) -> Option<Vec<f64>>;

    /// Names of all node properties the store carries.
    fn node_property_keys(&self) -> Vec<String>;

    /// Persist a per-node result column under `property`.
    fn write_node_property(&self, property: &str, values: &[f64]) -> SourceResult<u64>;

    /// Whether this source rejects mutation. Write-mode invocations against
    /// a read-only source fail before any graph work starts.
    fn is_read_only(&self) -> bool {
        false
    }
}

/// In-memory property graph used by tests, fixtures and embedded callers.
pub struct MemoryGraphSource {
    labels_per_node: Vec<Vec<String>>,
    relationships: Vec<(String, SourceRelationship)>,
    node_properties: HashMap<String, Vec<f64>>,
    written: RwLock<HashMap<String, Vec<f64>>>,
    read_only: bool,
}

impl MemoryGraphSource {
    /// A store of `node_count` unlabeled nodes with no relationships.
    pub fn new(node_count: u64) -> Self {
        Self {
            labels_per_node: vec![Vec::new(); node_count as usize],
            relationships: Vec::new(),
            node_properties: HashMap::new(),
            written: RwLock::new(HashMap::new()),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn add_label(&mut self, node_id: u64, label: &str) {
        let labels = &mut self.labels_per_node[node_id as usize];
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }

    pub fn add_relationship(&mut self, rel_type: &str, source: u64, target: u64) {
        self.relationships
            .push((rel_type.to_string(), SourceRelationship { source, target }));
    }

    pub fn set_node_property(&mut self, property: &str, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.labels_per_node.len(),
            "property column length must match node count"
        );
        self.node_properties.insert(property.to_string(), values);
    }

    /// Reads back a column persisted by write-back; test affordance.
    pub fn written_property(&self, property: &str) -> Option<Vec<f64>> {
        self.written.read().get(property).cloned()
    }
}

impl GraphSource for MemoryGraphSource {
    fn node_count(&self) -> u64 {
        self.labels_per_node.len() as u64
    }

    fn node_labels(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for labels in &self.labels_per_node {
            for label in labels {
                if !seen.contains(label) {
                    seen.push(label.clone());
                }
            }
        }
        seen
    }

    fn relationship_types(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (rel_type, _) in &self.relationships {
            if !seen.contains(rel_type) {
                seen.push(rel_type.clone());
            }
        }
        seen
    }

    fn labels_of(&self, node_id: u64) -> Vec<String> {
        self.labels_per_node[node_id as usize].clone()
    }

    fn relationships(&self, selector: &ElementSelector) -> Vec<SourceRelationship> {
        self.relationships
            .iter()
            .filter(|(rel_type, _)| selector.matches(rel_type))
            .map(|(_, rel)| *rel)
            .collect()
    }

    fn node_property(&self, property: &str) -> Option<Vec<f64>> {
        self.node_properties.get(property).cloned()
    }

    fn node_property_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.node_properties.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn write_node_property(&self, property: &str, values: &[f64]) -> SourceResult<u64> {
        if self.read_only {
            return Err(SourceError::WriteFailed(format!(
                "source is read-only, cannot write property `{property}`"
            )));
        }
        self.written
            .write()
            .insert(property.to_string(), values.to_vec());
        Ok(values.len() as u64)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
