// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Process-wide graph catalog
//!
//! The catalog maps an (owner, graph name) key to a previously materialized
//! graph so multiple invocations can reuse one projection. It is the only
//! state shared across invocations; one `RwLock` over the whole map keeps
//! `create`/`get`/`remove`/`list` linearizable, and `list` never observes a
//! torn state. Entries live until explicit removal or `clear` -- nothing is
//! garbage-collected implicitly.
//!
//! Duplicate policy: first writer wins. Under concurrent `create` calls for
//! the same key the loser receives `GraphAlreadyExists`; occupancy check
//! and insertion happen under a single write-lock hold.

use super::error::{CatalogError, CatalogResult};
use crate::graph::{Graph, GraphProjection};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog key: owner identity plus the user-assigned graph name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub username: String,
    pub graph_name: String,
}

impl CatalogKey {
    pub fn new(username: impl Into<String>, graph_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            graph_name: graph_name.into(),
        }
    }
}

/// A registered graph together with the exact configuration that created it.
#[derive(Debug)]
pub struct CatalogEntry {
    pub graph: Arc<Graph>,
    pub projection: GraphProjection,
    pub created_at: DateTime<Utc>,
}

/// One row of catalog introspection output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphInfo {
    pub name: String,
    pub nodes: u64,
    pub relationships: u64,
    /// Relationship-type summary of the stored projection.
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

/// Process-wide registry of named, materialized graphs.
///
/// Constructed once at engine start and injected into the pipeline; not a
/// language-level singleton.
#[derive(Default)]
pub struct GraphCatalog {
    entries: RwLock<HashMap<CatalogKey, Arc<CatalogEntry>>>,
    database: String,
}

impl GraphCatalog {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            database: database.into(),
        }
    }

    /// Registers `graph` under `key`. Fails if the key is taken.
    pub fn set(
        &self,
        key: CatalogKey,
        graph: Arc<Graph>,
        projection: GraphProjection,
    ) -> CatalogResult<Arc<CatalogEntry>> {
        if key.graph_name.is_empty() {
            return Err(CatalogError::EmptyGraphName);
        }
        let entry = Arc::new(CatalogEntry {
            graph,
            projection,
            created_at: Utc::now(),
        });
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(CatalogError::GraphAlreadyExists(key.graph_name));
        }
        log::info!(
            "Registered graph '{}' for user '{}'",
            key.graph_name,
            key.username
        );
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    pub fn get(&self, key: &CatalogKey) -> CatalogResult<Arc<CatalogEntry>> {
        self.entries
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| CatalogError::GraphNotFound {
                name: key.graph_name.clone(),
                database: self.database.clone(),
            })
    }

    pub fn exists(&self, key: &CatalogKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Removes `key` if present. Idempotent: removing an absent key is a
    /// no-op so teardown paths stay simple.
    pub fn remove(&self, key: &CatalogKey) -> Option<Arc<CatalogEntry>> {
        let removed = self.entries.write().remove(key);
        if removed.is_some() {
            log::info!(
                "Dropped graph '{}' for user '{}'",
                key.graph_name,
                key.username
            );
        }
        removed
    }

    /// Drops every entry; full reset between independent workloads.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            log::info!("Cleared graph catalog ({dropped} entries)");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the currently registered set for `username`, sorted by
    /// graph name. Taken under one read-lock hold, so concurrent mutations
    /// never produce a torn view.
    pub fn list(&self, username: &str) -> Vec<GraphInfo> {
        let entries = self.entries.read();
        let mut rows: Vec<GraphInfo> = entries
            .iter()
            .filter(|(key, _)| key.username == username)
            .map(|(key, entry)| GraphInfo {
                name: key.graph_name.clone(),
                nodes: entry.graph.node_count(),
                relationships: entry.graph.relationship_count(),
                relationship_type: entry.projection.relationship_selector.summary(),
                direction: entry.projection.orientation.name().to_string(),
                created_at: entry.created_at,
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }
}
