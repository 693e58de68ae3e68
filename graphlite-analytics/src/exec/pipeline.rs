// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure execution pipeline
//!
//! One invocation walks a fixed phase sequence and either completes or
//! fails; there is no suspension and no retry:
//!
//! 1. read-only policy check (write mode only)
//! 2. configuration validation
//! 3. graph resolution (catalog lookup or ephemeral materialization)
//! 4. seed-property validation
//! 5. memory estimation and admission
//! 6. compute
//! 7. write-back (write mode only)
//! 8. emit
//!
//! Failing any phase leaves no resources allocated by later phases; the
//! admission check in particular runs strictly before algorithm buffers
//! exist.

use super::context::{ExecutionContext, ProgressTimer, TerminationFlag};
use super::error::{ExecutionError, ExecutionResult};
use super::result::{ProcedureOutput, ResultStream, SummaryRow, Timings};
use crate::algorithms::{Algorithm, ComputeOutput, NodeValues};
use crate::catalog::{CatalogKey, GraphCatalog};
use crate::config::{
    ConfigError, ConfigMap, FacetRequirements, GraphSelector, ProcedureConfig, WriteFacet,
    KEY_WRITE_PROPERTY,
};
use crate::graph::{load_graph, ElementSelector, Graph, GraphProjection, GraphSource, ProjectionError};
use crate::mem::MemoryGuard;
use rayon::prelude::*;
use std::sync::Arc;

/// How results leave the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Per-node rows, no store mutation.
    Stream,
    /// Persist results, emit one summary row.
    Write,
}

impl ExecutionMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionMode::Stream => "stream",
            ExecutionMode::Write => "write",
        }
    }
}

/// Executes algorithm procedures against a source, a catalog and a memory
/// guard. One runner is shared by all operations of an engine; per
/// invocation state lives in the `ExecutionContext`.
pub struct ProcedureRunner<'a> {
    pub(crate) source: &'a dyn GraphSource,
    pub(crate) catalog: &'a GraphCatalog,
    pub(crate) guard: &'a MemoryGuard,
    pub(crate) username: &'a str,
}

impl ProcedureRunner<'_> {
    /// Runs `algorithm` in `mode` under the raw configuration.
    pub fn run(
        &self,
        algorithm: &dyn Algorithm,
        mode: ExecutionMode,
        raw: &ConfigMap,
        termination: TerminationFlag,
    ) -> ExecutionResult<ProcedureOutput> {
        // policy check: a mutating invocation never touches a read-only
        // source, independent of the algorithm chosen
        if mode == ExecutionMode::Write && self.source.is_read_only() {
            return Err(ExecutionError::ReadOnlyViolation {
                procedure: format!("{}.{}", algorithm.name(), mode.name()),
            });
        }

        let config = self.validate_config(algorithm, mode, raw)?;

        let create_timer = ProgressTimer::start();
        let graph = self.resolve_graph(algorithm, &config)?;
        let create_millis = create_timer.elapsed_millis();

        self.validate_seed_property(&config, &graph)?;

        let estimation = algorithm.memory_estimation(&config, &graph.dimensions());
        self.guard.check(&estimation)?;

        let context = ExecutionContext::new(config.concurrency, termination)
            .map_err(|e| ExecutionError::WorkerPool(e.to_string()))?;

        let (output, compute_millis) = if graph.is_empty() {
            (ComputeOutput::new(NodeValues::Longs(Vec::new())), 0)
        } else {
            let compute_timer = ProgressTimer::start();
            let output = algorithm.compute(&graph, &config, &context)?;
            (output, compute_timer.elapsed_millis())
        };
        log::debug!(
            "{} computed in {compute_millis} ms (job {})",
            algorithm.name(),
            context.job_id()
        );

        match mode {
            ExecutionMode::Stream => Ok(ProcedureOutput::Stream {
                timings: Timings {
                    create_millis,
                    compute_millis,
                    write_millis: None,
                },
                rows: ResultStream::new(output.values),
            }),
            ExecutionMode::Write => {
                // validation guarantees the facet in write mode
                let Some(facet) = &config.write else {
                    return Err(ConfigError::MissingValue(KEY_WRITE_PROPERTY.to_string()).into());
                };
                let write_timer = ProgressTimer::start();
                let written = self.write_back(&output.values, facet)?;
                let write_millis = write_timer.elapsed_millis();
                Ok(ProcedureOutput::Summary(SummaryRow {
                    node_count: graph.node_count(),
                    relationship_count: graph.relationship_count(),
                    create_millis,
                    compute_millis,
                    write_millis,
                    node_properties_written: written,
                    stats: output.stats,
                }))
            }
        }
    }

    /// Phase 2: facet validation plus the algorithm's own parameter check.
    pub(crate) fn validate_config(
        &self,
        algorithm: &dyn Algorithm,
        mode: ExecutionMode,
        raw: &ConfigMap,
    ) -> ExecutionResult<ProcedureConfig> {
        let requirements = FacetRequirements {
            write_mode: mode == ExecutionMode::Write,
            supports_seeding: algorithm.supports_seeding(),
            algorithm_keys: algorithm.config_keys(),
            default_orientation: algorithm.default_orientation(),
        };
        let config = ProcedureConfig::parse(raw, &requirements)?;
        algorithm.validate_params(&config.algorithm_params)?;
        Ok(config)
    }

    /// Phase 3: catalog lookup or ephemeral materialization.
    fn resolve_graph(
        &self,
        algorithm: &dyn Algorithm,
        config: &ProcedureConfig,
    ) -> ExecutionResult<Arc<Graph>> {
        match &config.selector {
            GraphSelector::Inline(projection) => {
                log::debug!("Materializing ephemeral graph for {}", algorithm.name());
                Ok(Arc::new(load_graph(self.source, projection)?))
            }
            GraphSelector::Catalog {
                graph_name,
                node_labels,
                relationship_types,
            } => {
                let key = CatalogKey::new(self.username, graph_name.clone());
                let entry = self.catalog.get(&key)?;

                let missing_labels = node_labels.missing_from(entry.graph.labels());
                if !missing_labels.is_empty() {
                    return Err(ProjectionError::LabelsNotFound(missing_labels).into());
                }
                let missing_types =
                    relationship_types.missing_from(entry.graph.relationship_types());
                if !missing_types.is_empty() {
                    return Err(ProjectionError::RelationshipTypesNotFound(missing_types).into());
                }

                let unfiltered = *node_labels == ElementSelector::All
                    && *relationship_types == ElementSelector::All;
                if unfiltered {
                    Ok(entry.graph.clone())
                } else {
                    // narrowed view: re-materialize from the source under
                    // the stored projection with tightened selectors
                    let narrowed = GraphProjection {
                        node_selector: node_labels.clone(),
                        relationship_selector: relationship_types.clone(),
                        ..entry.projection.clone()
                    };
                    Ok(Arc::new(load_graph(self.source, &narrowed)?))
                }
            }
        }
    }

    /// Phase 4: the configured seed property must be part of the resolved
    /// graph's projected property set.
    fn validate_seed_property(
        &self,
        config: &ProcedureConfig,
        graph: &Graph,
    ) -> ExecutionResult<()> {
        if let Some(property) = &config.seed_property {
            if graph.node_property(property).is_none() {
                return Err(ExecutionError::SeedPropertyNotFound {
                    property: property.clone(),
                    available: graph.node_property_keys(),
                });
            }
        }
        Ok(())
    }

    /// Phase 7: persist the result column under the write facet's property,
    /// fanning out on a pool bounded by the write concurrency.
    fn write_back(&self, values: &NodeValues, facet: &WriteFacet) -> ExecutionResult<u64> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(facet.write_concurrency.get())
            .build()
            .map_err(|e| ExecutionError::WorkerPool(e.to_string()))?;
        let column: Vec<f64> = pool.install(|| match values {
            NodeValues::Longs(v) => v.par_iter().map(|&x| x as f64).collect(),
            NodeValues::Doubles(v) => v.clone(),
        });
        let written = self
            .source
            .write_node_property(&facet.write_property, &column)?;
        log::debug!(
            "Wrote {written} values to property `{}`",
            facet.write_property
        );
        Ok(written)
    }
}
