// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Centrality algorithms

use super::{positive_param, Algorithm, AlgorithmResult, ComputeOutput, NodeValues};
use crate::config::{ConfigError, ConfigMap, ConfigResult, ProcedureConfig};
use crate::exec::context::{ExecutionContext, TerminatedError, RUN_CHECK_NODE_COUNT};
use crate::graph::{Graph, GraphDimensions};
use crate::mem::sizes::size_of_double_array;
use crate::mem::{MemoryEstimationBuilder, MemoryTree};
use rayon::prelude::*;

/// Degree centrality under the loaded orientation.
///
/// The direction is a projection concern: a `REVERSE` projection yields
/// incoming degrees, `NATURAL` outgoing ones. Scores are plain degrees.
pub struct DegreeCentrality;

impl Algorithm for DegreeCentrality {
    fn name(&self) -> &'static str {
        "degree"
    }

    fn memory_estimation(&self, _config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        // one score per node; no variability
        MemoryEstimationBuilder::new("Degree Centrality")
            .fixed("scores", size_of_double_array(dims.node_count))
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        _config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let node_count = graph.node_count() as usize;
        let termination = context.termination().clone();
        let scores: Result<Vec<f64>, TerminatedError> = context.run(|| {
            (0..node_count)
                .into_par_iter()
                .map(|node| {
                    if node % RUN_CHECK_NODE_COUNT == 0 {
                        termination.assert_running()?;
                    }
                    Ok(graph.degree(node as u64) as f64)
                })
                .collect()
        });
        Ok(ComputeOutput::new(NodeValues::Doubles(scores?)))
    }
}

pub const KEY_DAMPING_FACTOR: &str = "dampingFactor";
pub const KEY_MAX_ITERATIONS: &str = "maxIterations";
pub const KEY_TOLERANCE: &str = "tolerance";

const DEFAULT_DAMPING_FACTOR: f64 = 0.85;
const DEFAULT_MAX_ITERATIONS: u64 = 20;
const DEFAULT_TOLERANCE: f64 = 1e-7;

struct PageRankParams {
    damping_factor: f64,
    max_iterations: u64,
    tolerance: f64,
}

impl PageRankParams {
    fn from_config(params: &ConfigMap) -> ConfigResult<Self> {
        let damping_factor = params
            .optional_f64(KEY_DAMPING_FACTOR)?
            .unwrap_or(DEFAULT_DAMPING_FACTOR);
        if !(0.0..1.0).contains(&damping_factor) {
            return Err(ConfigError::InvalidValue(format!(
                "The value of `{KEY_DAMPING_FACTOR}` must be in [0, 1), got {damping_factor}"
            )));
        }
        let tolerance = params.optional_f64(KEY_TOLERANCE)?.unwrap_or(DEFAULT_TOLERANCE);
        if tolerance < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "The value of `{KEY_TOLERANCE}` must not be negative, got {tolerance}"
            )));
        }
        Ok(Self {
            damping_factor,
            max_iterations: positive_param(params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS)?,
            tolerance,
        })
    }
}

/// PageRank by power iteration with uniform teleport and dangling-mass
/// redistribution. Converges when the L1 delta of one iteration drops
/// below the tolerance.
pub struct PageRank;

impl Algorithm for PageRank {
    fn name(&self) -> &'static str {
        "pageRank"
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[KEY_DAMPING_FACTOR, KEY_MAX_ITERATIONS, KEY_TOLERANCE]
    }

    fn validate_params(&self, params: &ConfigMap) -> ConfigResult<()> {
        PageRankParams::from_config(params).map(|_| ())
    }

    fn memory_estimation(&self, config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        let concurrency = config.concurrency.get();
        MemoryEstimationBuilder::new("PageRank")
            .fixed("rank vector", size_of_double_array(dims.node_count))
            .fixed("next rank vector", size_of_double_array(dims.node_count))
            .per_thread(
                "per-thread contribution buffers",
                concurrency,
                size_of_double_array(dims.node_count),
            )
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let params = PageRankParams::from_config(&config.algorithm_params)?;
        let node_count = graph.node_count() as usize;
        let concurrency = context.concurrency().get();
        let termination = context.termination();

        let initial = 1.0 / node_count as f64;
        let mut ranks = vec![initial; node_count];
        let mut ran_iterations = 0u64;
        let mut did_converge = false;

        let shard_size = node_count.div_ceil(concurrency.max(1));

        while ran_iterations < params.max_iterations {
            termination.assert_running()?;

            let current = &ranks;
            // Per-shard contribution buffers, reduced by summation; no
            // shard ever writes into another's buffer.
            let (contributions, dangling_mass) = context.run(|| {
                (0..concurrency)
                    .into_par_iter()
                    .map(|shard| {
                        let start = shard * shard_size;
                        let end = ((shard + 1) * shard_size).min(node_count);
                        let mut local = vec![0.0f64; node_count];
                        let mut dangling = 0.0f64;
                        for node in start..end {
                            let degree = graph.degree(node as u64);
                            if degree == 0 {
                                dangling += current[node];
                                continue;
                            }
                            let share = current[node] / degree as f64;
                            for &target in graph.neighbors(node as u64) {
                                local[target as usize] += share;
                            }
                        }
                        (local, dangling)
                    })
                    .reduce(
                        || (vec![0.0f64; node_count], 0.0f64),
                        |(mut acc, acc_dangling), (local, dangling)| {
                            for (slot, value) in acc.iter_mut().zip(local) {
                                *slot += value;
                            }
                            (acc, acc_dangling + dangling)
                        },
                    )
            });

            let teleport = (1.0 - params.damping_factor) / node_count as f64;
            let dangling_share = params.damping_factor * dangling_mass / node_count as f64;
            let next: Vec<f64> = contributions
                .into_iter()
                .map(|incoming| teleport + dangling_share + params.damping_factor * incoming)
                .collect();

            let delta: f64 = next
                .iter()
                .zip(ranks.iter())
                .map(|(a, b)| (a - b).abs())
                .sum();
            ranks = next;
            ran_iterations += 1;
            if delta < params.tolerance {
                did_converge = true;
                break;
            }
        }

        Ok(ComputeOutput::new(NodeValues::Doubles(ranks))
            .with_stat("ranIterations", ran_iterations)
            .with_stat("didConverge", did_converge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Concurrency, FacetRequirements};
    use crate::exec::context::TerminationFlag;
    use crate::graph::{load_graph, GraphProjection, MemoryGraphSource, Orientation};
    use serde_json::json;

    fn config_for(algo: &dyn Algorithm, map: ConfigMap) -> ProcedureConfig {
        let requirements = FacetRequirements {
            write_mode: false,
            supports_seeding: false,
            algorithm_keys: algo.config_keys(),
            default_orientation: algo.default_orientation(),
        };
        ProcedureConfig::parse(&map, &requirements).unwrap()
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(Concurrency::new(2).unwrap(), TerminationFlag::running_true())
            .unwrap()
    }

    #[test]
    fn test_degree_natural_counts_outgoing() {
        let mut source = MemoryGraphSource::new(3);
        source.add_relationship("REL", 0, 1);
        source.add_relationship("REL", 0, 2);
        let graph = load_graph(&source, &GraphProjection::default()).unwrap();
        let output = DegreeCentrality
            .compute(&graph, &config_for(&DegreeCentrality, ConfigMap::empty()), &context())
            .unwrap();
        assert_eq!(output.values, NodeValues::Doubles(vec![2.0, 0.0, 0.0]));
    }

    #[test]
    fn test_degree_reverse_counts_incoming() {
        let mut source = MemoryGraphSource::new(3);
        source.add_relationship("REL", 0, 1);
        source.add_relationship("REL", 0, 2);
        let projection = GraphProjection {
            orientation: Orientation::Reverse,
            ..GraphProjection::default()
        };
        let graph = load_graph(&source, &projection).unwrap();
        let output = DegreeCentrality
            .compute(&graph, &config_for(&DegreeCentrality, ConfigMap::empty()), &context())
            .unwrap();
        assert_eq!(output.values, NodeValues::Doubles(vec![0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_pagerank_ranks_sink_highest() {
        // 0 -> 2, 1 -> 2: node 2 accumulates rank
        let mut source = MemoryGraphSource::new(3);
        source.add_relationship("REL", 0, 2);
        source.add_relationship("REL", 1, 2);
        let graph = load_graph(&source, &GraphProjection::default()).unwrap();
        let output = PageRank
            .compute(&graph, &config_for(&PageRank, ConfigMap::empty()), &context())
            .unwrap();

        let NodeValues::Doubles(ranks) = &output.values else {
            panic!("pagerank yields double values");
        };
        assert!(ranks[2] > ranks[0]);
        assert!(ranks[2] > ranks[1]);
        assert!((ranks[0] - ranks[1]).abs() < 1e-9);
    }

    #[test]
    fn test_pagerank_uniform_on_isolated_nodes() {
        let source = MemoryGraphSource::new(4);
        let graph = load_graph(&source, &GraphProjection::default()).unwrap();
        let output = PageRank
            .compute(&graph, &config_for(&PageRank, ConfigMap::empty()), &context())
            .unwrap();
        let NodeValues::Doubles(ranks) = &output.values else {
            panic!("pagerank yields double values");
        };
        for &rank in ranks {
            assert!((rank - 0.25).abs() < 1e-6);
        }
        assert_eq!(output.stats["didConverge"], true);
    }

    #[test]
    fn test_pagerank_rejects_damping_out_of_range() {
        let params = ConfigMap::empty().with(KEY_DAMPING_FACTOR, json!(1.5));
        assert!(PageRank.validate_params(&params).is_err());
    }

    #[test]
    fn test_pagerank_respects_iteration_budget() {
        let mut source = MemoryGraphSource::new(2);
        source.add_relationship("REL", 0, 1);
        source.add_relationship("REL", 1, 0);
        let graph = load_graph(&source, &GraphProjection::default()).unwrap();
        let map = ConfigMap::empty()
            .with(KEY_MAX_ITERATIONS, json!(3))
            .with(KEY_TOLERANCE, json!(0.0));
        let output = PageRank
            .compute(&graph, &config_for(&PageRank, map), &context())
            .unwrap();
        assert_eq!(output.stats["ranIterations"], 3);
        assert_eq!(output.stats["didConverge"], false);
    }
}
