// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Algorithm plugin units
//!
//! The pipeline treats algorithms as opaque units: given a graph, a
//! validated configuration and an execution context they produce per-node
//! values plus aggregate statistics, and they describe their memory needs
//! up front. New algorithms implement [`Algorithm`] and get registered in
//! the procedure registry; the pipeline itself never changes.
//!
//! Implementations are grouped by family:
//! - [`components`] -- connectivity (WCC)
//! - [`community`] -- K1Coloring, label propagation, Louvain
//! - [`centrality`] -- degree centrality, PageRank

pub mod centrality;
pub mod community;
pub mod components;

use crate::config::{ConfigError, ConfigMap, ConfigResult, ProcedureConfig};
use crate::exec::context::{ExecutionContext, TerminatedError};
use crate::graph::{Graph, GraphDimensions, Orientation};
use crate::mem::MemoryTree;
use serde_json::{Map, Value};
use thiserror::Error;

pub use centrality::{DegreeCentrality, PageRank};
pub use community::{K1Coloring, LabelPropagation, Louvain};
pub use components::Wcc;

/// Failures inside an algorithm run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgorithmError {
    #[error(transparent)]
    Terminated(#[from] TerminatedError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Per-node result column of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValues {
    Longs(Vec<u64>),
    Doubles(Vec<f64>),
}

impl NodeValues {
    pub fn len(&self) -> usize {
        match self {
            NodeValues::Longs(v) => v.len(),
            NodeValues::Doubles(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write-back representation; longs convert losslessly for the id
    /// ranges algorithms produce.
    pub fn to_doubles(&self) -> Vec<f64> {
        match self {
            NodeValues::Longs(v) => v.iter().map(|&x| x as f64).collect(),
            NodeValues::Doubles(v) => v.clone(),
        }
    }
}

/// What a compute phase hands back to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeOutput {
    pub values: NodeValues,
    /// Algorithm statistics merged into the summary row
    /// (e.g. `componentCount`, `ranIterations`, `didConverge`).
    pub stats: Map<String, Value>,
}

impl ComputeOutput {
    pub fn new(values: NodeValues) -> Self {
        Self {
            values,
            stats: Map::new(),
        }
    }

    pub fn with_stat(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.stats.insert(key.to_string(), value.into());
        self
    }
}

/// An algorithm pluggable into the execution pipeline.
///
/// `memory_estimation` must be a pure function of configuration and graph
/// dimensions. `compute` runs inside the context's bounded pool and checks
/// the termination flag at least every
/// [`RUN_CHECK_NODE_COUNT`](crate::exec::context::RUN_CHECK_NODE_COUNT)
/// work units.
pub trait Algorithm: Send + Sync {
    /// Registry name, e.g. `wcc`.
    fn name(&self) -> &'static str;

    /// Whether the seed facet applies to this algorithm.
    fn supports_seeding(&self) -> bool {
        false
    }

    /// Algorithm-specific configuration keys passed through untouched.
    fn config_keys(&self) -> &'static [&'static str] {
        &[]
    }

    /// Orientation used when the caller does not configure one.
    fn default_orientation(&self) -> Orientation {
        Orientation::Natural
    }

    /// Validates the pass-through parameters; runs during configuration
    /// validation so bad parameters fail before any graph work.
    fn validate_params(&self, _params: &ConfigMap) -> ConfigResult<()> {
        Ok(())
    }

    fn memory_estimation(&self, config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree;

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput>;
}

/// Shared helper: a positive-integer parameter with a default.
pub(crate) fn positive_param(map: &ConfigMap, key: &str, default: u64) -> ConfigResult<u64> {
    match map.optional_u64(key)? {
        None => Ok(default),
        Some(0) => Err(ConfigError::InvalidValue(format!(
            "The value of `{key}` must be a positive integer, got 0"
        ))),
        Some(value) => Ok(value),
    }
}

/// Shared helper: seed column as integral ids, if configured and projected.
pub(crate) fn seed_values(graph: &Graph, config: &ProcedureConfig) -> Option<Vec<u64>> {
    let property = config.seed_property.as_deref()?;
    let column = graph.node_property(property)?;
    Some(column.iter().map(|&v| v as u64).collect())
}
