//! Shared test fixtures for integration suites
#![allow(dead_code)]

use graphlite_analytics::{AnalyticsEngine, MemoryGraphSource};
use serde_json::Value;
use std::sync::Arc;

pub use graphlite_analytics::ConfigMap;

/// An engine over an in-memory source, keeping the source handle around so
/// tests can inspect written-back properties.
pub struct TestFixture {
    pub source: Arc<MemoryGraphSource>,
    pub engine: AnalyticsEngine,
}

impl TestFixture {
    pub fn new(source: MemoryGraphSource) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let source = Arc::new(source);
        let engine = AnalyticsEngine::new(source.clone());
        Self { source, engine }
    }

    /// Four nodes, edges (0 -> 1) and (0 -> 2); the coloring scenario graph.
    pub fn star() -> Self {
        let mut source = MemoryGraphSource::new(4);
        source.add_relationship("REL", 0, 1);
        source.add_relationship("REL", 0, 2);
        Self::new(source)
    }

    /// A graph with zero nodes.
    pub fn empty() -> Self {
        Self::new(MemoryGraphSource::new(0))
    }

    /// `count` nodes, no relationships.
    pub fn isolated(count: u64) -> Self {
        Self::new(MemoryGraphSource::new(count))
    }

    /// Three nodes labeled `A`, `B`, `B`; one `X` relationship.
    pub fn labeled_ab() -> Self {
        let mut source = MemoryGraphSource::new(3);
        source.add_label(0, "A");
        source.add_label(1, "B");
        source.add_label(2, "B");
        source.add_relationship("X", 0, 1);
        Self::new(source)
    }

    /// Two triangles bridged by one relationship.
    pub fn two_cliques() -> Self {
        let mut source = MemoryGraphSource::new(6);
        for &(s, t) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)] {
            source.add_relationship("REL", s, t);
        }
        Self::new(source)
    }
}

/// Builds a `ConfigMap` from `(key, json value)` pairs.
pub fn config(pairs: &[(&str, Value)]) -> ConfigMap {
    let mut map = ConfigMap::empty();
    for (key, value) in pairs {
        map.insert(key, value.clone());
    }
    map
}
