// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Analytics engine facade
//!
//! The embedding entry point: owns the graph source, the process-wide
//! catalog, the memory guard and the procedure registry, and coordinates
//! invocations through the pipeline. Catalog operations are explicit
//! methods; algorithm operations dispatch by registered name.

use super::context::TerminationFlag;
use super::error::{ExecutionError, ExecutionResult};
use super::pipeline::ProcedureRunner;
use super::registry::{register_all, ProcedureRegistry};
use super::result::{EstimateRow, ProcedureOutput};
use crate::catalog::{CatalogKey, GraphCatalog, GraphInfo};
use crate::config::{ConfigMap, ProcedureConfig, GraphSelector};
use crate::graph::{load_graph, GraphDimensions, GraphProjection, GraphSource, Orientation};
use std::sync::Arc;

const DEFAULT_DATABASE: &str = "graphlite";
const DEFAULT_USERNAME: &str = "default";

/// Orchestrates algorithm execution over one graph source.
pub struct AnalyticsEngine {
    source: Arc<dyn GraphSource>,
    catalog: Arc<GraphCatalog>,
    guard: crate::mem::MemoryGuard,
    registry: ProcedureRegistry,
    username: String,
}

impl AnalyticsEngine {
    /// Engine with the built-in algorithm set, an unlimited memory guard
    /// and the default owner identity.
    pub fn new(source: Arc<dyn GraphSource>) -> Self {
        Self {
            source,
            catalog: Arc::new(GraphCatalog::new(DEFAULT_DATABASE)),
            guard: crate::mem::MemoryGuard::unlimited(),
            registry: register_all(),
            username: DEFAULT_USERNAME.to_string(),
        }
    }

    pub fn with_memory_guard(mut self, guard: crate::mem::MemoryGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn catalog(&self) -> &GraphCatalog {
        &self.catalog
    }

    /// All registered operation names, sorted.
    pub fn operations(&self) -> Vec<String> {
        self.registry.operation_names()
    }

    /// Runs an operation by registered name, e.g. `wcc.stream`,
    /// `k1coloring.write` or `pageRank.write.estimate`.
    pub fn run(&self, operation: &str, config: &ConfigMap) -> ExecutionResult<ProcedureOutput> {
        self.run_with_termination(operation, config, TerminationFlag::running_true())
    }

    /// Like [`run`](Self::run) but with a caller-owned termination flag for
    /// cooperative cancellation.
    pub fn run_with_termination(
        &self,
        operation: &str,
        config: &ConfigMap,
        termination: TerminationFlag,
    ) -> ExecutionResult<ProcedureOutput> {
        let entry = self
            .registry
            .get(operation)
            .ok_or_else(|| ExecutionError::ProcedureNotFound(operation.to_string()))?
            .clone();

        log::info!("Running procedure `{operation}`");
        let runner = self.runner();
        if entry.estimate {
            let typed = runner.validate_config(entry.algorithm.as_ref(), entry.mode, config)?;
            let dims = self.estimate_dimensions(&typed)?;
            let tree = entry.algorithm.memory_estimation(&typed, &dims);
            let range = tree.memory_usage();
            Ok(ProcedureOutput::Estimate(EstimateRow {
                node_count: dims.node_count,
                relationship_count: dims.relationship_count,
                required_memory: range.to_string(),
                bytes_min: range.min(),
                bytes_max: range.max(),
                tree_view: tree.render(),
            }))
        } else {
            runner.run(entry.algorithm.as_ref(), entry.mode, config, termination)
        }
    }

    /// Materializes a graph under `name` and registers it in the catalog.
    pub fn graph_project(&self, name: &str, config: &ConfigMap) -> ExecutionResult<GraphInfo> {
        config.require_only_keys(GraphProjection::config_keys())?;
        let projection = GraphProjection::from_config(config, Orientation::Natural)?;
        let graph = Arc::new(load_graph(self.source.as_ref(), &projection)?);
        let entry = self.catalog.set(
            CatalogKey::new(self.username.clone(), name),
            graph,
            projection,
        )?;
        Ok(GraphInfo {
            name: name.to_string(),
            nodes: entry.graph.node_count(),
            relationships: entry.graph.relationship_count(),
            relationship_type: entry.projection.relationship_selector.summary(),
            direction: entry.projection.orientation.name().to_string(),
            created_at: entry.created_at,
        })
    }

    /// Catalog introspection for the engine's owner identity.
    pub fn graph_list(&self) -> Vec<GraphInfo> {
        self.catalog.list(&self.username)
    }

    /// Drops `name` from the catalog; absent names are a no-op.
    pub fn graph_drop(&self, name: &str) {
        self.catalog
            .remove(&CatalogKey::new(self.username.clone(), name));
    }

    fn runner(&self) -> ProcedureRunner<'_> {
        ProcedureRunner {
            source: self.source.as_ref(),
            catalog: &self.catalog,
            guard: &self.guard,
            username: &self.username,
        }
    }

    /// Dimensions for estimation; never materializes an adjacency.
    fn estimate_dimensions(&self, config: &ProcedureConfig) -> ExecutionResult<GraphDimensions> {
        match &config.selector {
            GraphSelector::Catalog { graph_name, .. } => {
                let key = CatalogKey::new(self.username.clone(), graph_name.clone());
                Ok(self.catalog.get(&key)?.graph.dimensions())
            }
            GraphSelector::Inline(projection) => {
                let stored = self
                    .source
                    .relationships(&projection.relationship_selector)
                    .len() as u64;
                let relationship_count = match projection.orientation {
                    Orientation::Undirected => stored * 2,
                    _ => stored,
                };
                Ok(GraphDimensions {
                    node_count: self.source.node_count(),
                    relationship_count,
                })
            }
        }
    }
}
