// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connectivity algorithms
//!
//! Weakly connected components over the disjoint-set structure. Updates are
//! sharded: every worker builds a partial structure over the full universe
//! from its slice of the node range, and the partials are folded together
//! afterwards, so no unsynchronized concurrent unions ever happen.

use super::{seed_values, Algorithm, AlgorithmResult, ComputeOutput, NodeValues};
use crate::collections::DisjointSetStruct;
use crate::config::ProcedureConfig;
use crate::exec::context::{ExecutionContext, TerminatedError, RUN_CHECK_NODE_COUNT};
use crate::graph::{Graph, GraphDimensions};
use crate::mem::sizes::{size_of_byte_array, size_of_long_array};
use crate::mem::{MemoryEstimationBuilder, MemoryTree};
use rayon::prelude::*;
use std::collections::HashMap;

/// Weakly connected components. Reported community ids are representative
/// node ids, not dense indices.
pub struct Wcc;

impl Wcc {
    /// Parent and rank arrays of one disjoint-set structure.
    fn dss_bytes(node_count: u64) -> u64 {
        size_of_long_array(node_count) + size_of_byte_array(node_count)
    }
}

impl Algorithm for Wcc {
    fn name(&self) -> &'static str {
        "wcc"
    }

    fn supports_seeding(&self) -> bool {
        true
    }

    fn memory_estimation(&self, config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        let concurrency = config.concurrency.get();
        MemoryEstimationBuilder::new("WCC")
            .component(
                MemoryEstimationBuilder::new("disjoint set structure")
                    .fixed("parents", size_of_long_array(dims.node_count))
                    .fixed("ranks", size_of_byte_array(dims.node_count))
                    .build(),
            )
            .per_thread(
                "partial disjoint sets",
                concurrency,
                Self::dss_bytes(dims.node_count),
            )
            .fixed("community ids", size_of_long_array(dims.node_count))
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let node_count = graph.node_count() as usize;
        let mut dss = DisjointSetStruct::new(node_count);

        // Seeded nodes sharing a community id start in the same set.
        if let Some(seeds) = seed_values(graph, config) {
            let mut first_with_seed: HashMap<u64, usize> = HashMap::new();
            for (node, &seed) in seeds.iter().enumerate() {
                match first_with_seed.get(&seed) {
                    Some(&anchor) => {
                        dss.union(anchor, node);
                    }
                    None => {
                        first_with_seed.insert(seed, node);
                    }
                }
            }
        }

        let shard_count = context.concurrency().get();
        let shard_size = node_count.div_ceil(shard_count.max(1));
        let termination = context.termination().clone();

        let partials: Result<Vec<DisjointSetStruct>, TerminatedError> = context.run(|| {
            (0..shard_count)
                .into_par_iter()
                .map(|shard| {
                    let mut local = DisjointSetStruct::new(node_count);
                    let start = shard * shard_size;
                    let end = ((shard + 1) * shard_size).min(node_count);
                    for node in start..end {
                        if node % RUN_CHECK_NODE_COUNT == 0 {
                            termination.assert_running()?;
                        }
                        for &target in graph.neighbors(node as u64) {
                            local.union(node, target as usize);
                        }
                    }
                    Ok(local)
                })
                .collect()
        });
        for partial in partials? {
            dss.merge(&partial);
        }

        let communities: Vec<u64> = (0..node_count).map(|node| dss.find(node) as u64).collect();
        let component_count = dss.set_count() as u64;

        Ok(ComputeOutput::new(NodeValues::Longs(communities))
            .with_stat("componentCount", component_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::AlgorithmError;
    use crate::config::{ConfigMap, FacetRequirements, ProcedureConfig};
    use crate::exec::context::TerminationFlag;
    use crate::graph::{load_graph, GraphProjection, MemoryGraphSource, Orientation};
    use serde_json::json;

    fn config(map: ConfigMap) -> ProcedureConfig {
        let requirements = FacetRequirements {
            write_mode: false,
            supports_seeding: true,
            algorithm_keys: &[],
            default_orientation: Orientation::Natural,
        };
        ProcedureConfig::parse(&map, &requirements).unwrap()
    }

    fn context(concurrency: usize) -> ExecutionContext {
        ExecutionContext::new(
            crate::config::Concurrency::new(concurrency).unwrap(),
            TerminationFlag::running_true(),
        )
        .unwrap()
    }

    fn run(source: &MemoryGraphSource, map: ConfigMap, projection: GraphProjection) -> ComputeOutput {
        let graph = load_graph(source, &projection).unwrap();
        Wcc.compute(&graph, &config(map), &context(2)).unwrap()
    }

    #[test]
    fn test_two_components() {
        let mut source = MemoryGraphSource::new(5);
        source.add_relationship("REL", 0, 1);
        source.add_relationship("REL", 1, 2);
        source.add_relationship("REL", 3, 4);
        let output = run(&source, ConfigMap::empty(), GraphProjection::default());

        let NodeValues::Longs(communities) = &output.values else {
            panic!("wcc yields long values");
        };
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
        assert_eq!(communities[3], communities[4]);
        assert_ne!(communities[0], communities[3]);
        assert_eq!(output.stats["componentCount"], 2);
    }

    #[test]
    fn test_isolated_nodes_are_their_own_components() {
        let source = MemoryGraphSource::new(4);
        let output = run(&source, ConfigMap::empty(), GraphProjection::default());
        assert_eq!(output.stats["componentCount"], 4);
    }

    #[test]
    fn test_seeding_pre_joins_equal_seeds() {
        let mut source = MemoryGraphSource::new(4);
        source.set_node_property("seed", vec![7.0, 7.0, 9.0, 9.0]);
        let projection = GraphProjection {
            node_properties: vec!["seed".to_string()],
            ..GraphProjection::default()
        };
        let map = ConfigMap::empty().with("seedProperty", json!("seed"));
        let output = run(&source, map, projection);

        let NodeValues::Longs(communities) = &output.values else {
            panic!("wcc yields long values");
        };
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[2], communities[3]);
        assert_eq!(output.stats["componentCount"], 2);
    }

    #[test]
    fn test_cancellation_stops_compute() {
        let mut source = MemoryGraphSource::new(3);
        source.add_relationship("REL", 0, 1);
        let graph = load_graph(&source, &GraphProjection::default()).unwrap();
        let flag = TerminationFlag::running_true();
        flag.stop();
        let context = ExecutionContext::new(
            crate::config::Concurrency::new(1).unwrap(),
            flag,
        )
        .unwrap();
        let error = Wcc
            .compute(&graph, &config(ConfigMap::empty()), &context)
            .unwrap_err();
        assert!(matches!(error, AlgorithmError::Terminated(_)));
    }

    #[test]
    fn test_estimation_scales_partials_with_concurrency() {
        let dims = GraphDimensions {
            node_count: 100,
            relationship_count: 0,
        };
        let low = Wcc.memory_estimation(
            &config(ConfigMap::empty().with("concurrency", json!(1))),
            &dims,
        );
        let high = Wcc.memory_estimation(
            &config(ConfigMap::empty().with("concurrency", json!(4))),
            &dims,
        );
        assert!(high.memory_usage().min() > low.memory_usage().min());
    }
}
