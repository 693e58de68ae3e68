// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Community detection algorithms
//!
//! All three units run on an undirected view by default and iterate
//! synchronously: every round reads the previous round's state, so results
//! are deterministic regardless of worker scheduling.

use super::{
    positive_param, seed_values, Algorithm, AlgorithmResult, ComputeOutput, NodeValues,
};
use crate::config::{ConfigMap, ConfigResult, ProcedureConfig};
use crate::exec::context::{ExecutionContext, RUN_CHECK_NODE_COUNT};
use crate::graph::{Graph, GraphDimensions, Orientation};
use crate::mem::sizes::{size_of_double_array, size_of_long_array, BYTES_VEC_HEADER};
use crate::mem::{MemoryEstimationBuilder, MemoryRange, MemoryTree};
use rayon::prelude::*;
use std::collections::HashMap;

pub const KEY_MAX_ITERATIONS: &str = "maxIterations";
const DEFAULT_MAX_ITERATIONS: u64 = 10;

/// Scratch buffers whose size is bounded by the largest degree; true
/// variability, so min and max diverge.
fn per_thread_scratch(dims: &GraphDimensions) -> MemoryRange {
    let worst_case = dims.relationship_count.min(dims.node_count);
    MemoryRange::of_range(BYTES_VEC_HEADER, size_of_long_array(worst_case))
}

/// Greedy parallel graph coloring.
///
/// Rounds alternate a color phase (every flagged node picks the smallest
/// color unused among its neighbors) and a validation phase (of two
/// conflicting neighbors the higher id recolors next round) until no
/// conflicts remain or the iteration budget is exhausted.
pub struct K1Coloring;

impl Algorithm for K1Coloring {
    fn name(&self) -> &'static str {
        "k1coloring"
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[KEY_MAX_ITERATIONS]
    }

    fn default_orientation(&self) -> Orientation {
        Orientation::Undirected
    }

    fn validate_params(&self, params: &ConfigMap) -> ConfigResult<()> {
        positive_param(params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS).map(|_| ())
    }

    fn memory_estimation(&self, config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        MemoryEstimationBuilder::new("K1Coloring")
            .fixed("colors", size_of_long_array(dims.node_count))
            .fixed("color snapshot", size_of_long_array(dims.node_count))
            .fixed("nodes to color", size_of_long_array(dims.node_count))
            .component(
                MemoryEstimationBuilder::new("per-thread buffers")
                    .range("neighbor colors", per_thread_scratch(dims).times(config.concurrency.get() as u64))
                    .build(),
            )
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let max_iterations =
            positive_param(&config.algorithm_params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS)?;
        let node_count = graph.node_count() as usize;
        let termination = context.termination();

        let mut colors: Vec<u64> = vec![0; node_count];
        let mut to_color: Vec<bool> = vec![true; node_count];
        let mut ran_iterations = 0u64;
        let mut did_converge = false;

        while ran_iterations < max_iterations {
            termination.assert_running()?;

            let snapshot = colors.clone();
            colors = context.run(|| {
                (0..node_count)
                    .into_par_iter()
                    .map(|node| {
                        if !to_color[node] {
                            return snapshot[node];
                        }
                        smallest_free_color(&snapshot, graph.neighbors(node as u64))
                    })
                    .collect()
            });

            let validated = &colors;
            let conflicts: Vec<bool> = context.run(|| {
                (0..node_count)
                    .into_par_iter()
                    .map(|node| {
                        graph
                            .neighbors(node as u64)
                            .iter()
                            .any(|&other| {
                                (other as usize) < node
                                    && validated[other as usize] == validated[node]
                            })
                    })
                    .collect()
            });

            ran_iterations += 1;
            if conflicts.iter().all(|&c| !c) {
                did_converge = true;
                break;
            }
            to_color = conflicts;
        }

        let color_count = distinct_count(&colors);
        Ok(ComputeOutput::new(NodeValues::Longs(colors))
            .with_stat("colorCount", color_count)
            .with_stat("ranIterations", ran_iterations)
            .with_stat("didConverge", did_converge))
    }
}

fn smallest_free_color(colors: &[u64], neighbors: &[u64]) -> u64 {
    let mut used: Vec<u64> = neighbors
        .iter()
        .map(|&n| colors[n as usize])
        .collect();
    used.sort_unstable();
    used.dedup();
    let mut candidate = 0u64;
    for color in used {
        if color == candidate {
            candidate += 1;
        } else if color > candidate {
            break;
        }
    }
    candidate
}

fn distinct_count(values: &[u64]) -> u64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len() as u64
}

/// Synchronous label propagation.
///
/// Labels start as node ids (or seeds) and every round each node adopts the
/// most frequent label among its neighbors, smallest label on ties.
/// Converges when a round changes nothing.
pub struct LabelPropagation;

impl Algorithm for LabelPropagation {
    fn name(&self) -> &'static str {
        "labelPropagation"
    }

    fn supports_seeding(&self) -> bool {
        true
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[KEY_MAX_ITERATIONS]
    }

    fn default_orientation(&self) -> Orientation {
        Orientation::Undirected
    }

    fn validate_params(&self, params: &ConfigMap) -> ConfigResult<()> {
        positive_param(params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS).map(|_| ())
    }

    fn memory_estimation(&self, config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        MemoryEstimationBuilder::new("Label Propagation")
            .fixed("labels", size_of_long_array(dims.node_count))
            .fixed("next labels", size_of_long_array(dims.node_count))
            .range(
                "per-thread frequency maps",
                per_thread_scratch(dims).times(config.concurrency.get() as u64),
            )
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let max_iterations =
            positive_param(&config.algorithm_params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS)?;
        let node_count = graph.node_count() as usize;
        let termination = context.termination();

        let mut labels: Vec<u64> = match seed_values(graph, config) {
            Some(seeds) => seeds,
            None => (0..node_count as u64).collect(),
        };
        let mut ran_iterations = 0u64;
        let mut did_converge = false;

        while ran_iterations < max_iterations {
            termination.assert_running()?;

            let snapshot = &labels;
            let next: Vec<u64> = context.run(|| {
                (0..node_count)
                    .into_par_iter()
                    .map(|node| dominant_label(snapshot, graph.neighbors(node as u64), snapshot[node]))
                    .collect()
            });

            let changed = next != labels;
            labels = next;
            ran_iterations += 1;
            if !changed {
                did_converge = true;
                break;
            }
        }

        let community_count = distinct_count(&labels);
        Ok(ComputeOutput::new(NodeValues::Longs(labels))
            .with_stat("communityCount", community_count)
            .with_stat("ranIterations", ran_iterations)
            .with_stat("didConverge", did_converge))
    }
}

fn dominant_label(labels: &[u64], neighbors: &[u64], own: u64) -> u64 {
    if neighbors.is_empty() {
        return own;
    }
    let mut frequencies: HashMap<u64, usize> = HashMap::new();
    for &neighbor in neighbors {
        *frequencies.entry(labels[neighbor as usize]).or_insert(0) += 1;
    }
    let mut best = own;
    let mut best_count = 0usize;
    for (&label, &count) in &frequencies {
        if count > best_count || (count == best_count && label < best) {
            best = label;
            best_count = count;
        }
    }
    best
}

/// Single-level Louvain-style local moving.
///
/// Nodes greedily move to the neighboring community with the highest
/// modularity gain until a sweep moves nothing. The full multi-level
/// optimization loop lives behind the same plugin seam and is intentionally
/// not part of this unit.
pub struct Louvain;

impl Algorithm for Louvain {
    fn name(&self) -> &'static str {
        "louvain"
    }

    fn supports_seeding(&self) -> bool {
        true
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[KEY_MAX_ITERATIONS]
    }

    fn default_orientation(&self) -> Orientation {
        Orientation::Undirected
    }

    fn validate_params(&self, params: &ConfigMap) -> ConfigResult<()> {
        positive_param(params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS).map(|_| ())
    }

    fn memory_estimation(&self, _config: &ProcedureConfig, dims: &GraphDimensions) -> MemoryTree {
        // the local-move sweep is sequential, scratch does not scale with
        // concurrency
        MemoryEstimationBuilder::new("Louvain")
            .fixed("communities", size_of_long_array(dims.node_count))
            .fixed("community volumes", size_of_double_array(dims.node_count))
            .fixed("node degrees", size_of_double_array(dims.node_count))
            .range("community weight map", per_thread_scratch(dims))
            .build()
    }

    fn compute(
        &self,
        graph: &Graph,
        config: &ProcedureConfig,
        context: &ExecutionContext,
    ) -> AlgorithmResult<ComputeOutput> {
        let max_iterations =
            positive_param(&config.algorithm_params, KEY_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS)?;
        let node_count = graph.node_count() as usize;
        let termination = context.termination();

        // directed adjacency entries; an undirected view stores both ends
        let total_entries = graph.relationship_count() as f64;

        let mut communities: Vec<u64> = match seed_values(graph, config) {
            Some(seeds) => seeds,
            None => (0..node_count as u64).collect(),
        };

        let mut ran_iterations = 0u64;
        let mut did_converge = false;

        if total_entries > 0.0 {
            let degree_of: Vec<f64> = (0..node_count)
                .map(|n| graph.degree(n as u64) as f64)
                .collect();
            // volume of a community: sum of member degrees. Keyed by the
            // community id since seeded ids are not dense node indices.
            let mut volumes: HashMap<u64, f64> = HashMap::new();
            for node in 0..node_count {
                *volumes.entry(communities[node]).or_insert(0.0) += degree_of[node];
            }

            while ran_iterations < max_iterations {
                let mut moved = false;
                for node in 0..node_count {
                    if node % RUN_CHECK_NODE_COUNT == 0 {
                        termination.assert_running()?;
                    }
                    let current = communities[node];
                    let degree = degree_of[node];

                    let mut weights: HashMap<u64, f64> = HashMap::new();
                    for &neighbor in graph.neighbors(node as u64) {
                        *weights
                            .entry(communities[neighbor as usize])
                            .or_insert(0.0) += 1.0;
                    }

                    let links_to_current = weights.get(&current).copied().unwrap_or(0.0);
                    let volume_without_node =
                        volumes.get(&current).copied().unwrap_or(0.0) - degree;

                    let mut best_community = current;
                    let mut best_gain = 0.0f64;
                    let mut candidates: Vec<(u64, f64)> =
                        weights.iter().map(|(&c, &w)| (c, w)).collect();
                    // deterministic sweep order
                    candidates.sort_by_key(|(community, _)| *community);
                    for (community, links) in candidates {
                        if community == current {
                            continue;
                        }
                        let volume = volumes.get(&community).copied().unwrap_or(0.0);
                        let gain = (links - links_to_current) / total_entries
                            - degree * (volume - volume_without_node)
                                / (total_entries * total_entries);
                        if gain > best_gain {
                            best_gain = gain;
                            best_community = community;
                        }
                    }

                    if best_community != current {
                        *volumes.entry(current).or_insert(0.0) -= degree;
                        *volumes.entry(best_community).or_insert(0.0) += degree;
                        communities[node] = best_community;
                        moved = true;
                    }
                }
                ran_iterations += 1;
                if !moved {
                    did_converge = true;
                    break;
                }
            }
        } else {
            did_converge = true;
        }

        let modularity = modularity_of(graph, &communities);
        let community_count = distinct_count(&communities);
        Ok(ComputeOutput::new(NodeValues::Longs(communities))
            .with_stat("communityCount", community_count)
            .with_stat("ranIterations", ran_iterations)
            .with_stat("didConverge", did_converge)
            .with_stat("modularity", modularity))
    }
}

/// Modularity of a partition over an undirected view:
/// `Q = sum_c (in_c / M - (vol_c / M)^2)` with `M` directed entries.
fn modularity_of(graph: &Graph, communities: &[u64]) -> f64 {
    let total_entries = graph.relationship_count() as f64;
    if total_entries == 0.0 {
        return 0.0;
    }
    let mut internal: HashMap<u64, f64> = HashMap::new();
    let mut volume: HashMap<u64, f64> = HashMap::new();
    for node in 0..graph.node_count() {
        let community = communities[node as usize];
        *volume.entry(community).or_insert(0.0) += graph.degree(node) as f64;
        for &neighbor in graph.neighbors(node) {
            if communities[neighbor as usize] == community {
                *internal.entry(community).or_insert(0.0) += 1.0;
            }
        }
    }
    volume
        .iter()
        .map(|(community, &vol)| {
            let inside = internal.get(community).copied().unwrap_or(0.0);
            inside / total_entries - (vol / total_entries).powi(2)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Concurrency, ConfigMap, FacetRequirements};
    use crate::exec::context::TerminationFlag;
    use crate::graph::{load_graph, GraphProjection, MemoryGraphSource};
    use serde_json::json;

    fn config_for(algo: &dyn Algorithm, map: ConfigMap) -> ProcedureConfig {
        let requirements = FacetRequirements {
            write_mode: false,
            supports_seeding: algo.supports_seeding(),
            algorithm_keys: algo.config_keys(),
            default_orientation: algo.default_orientation(),
        };
        ProcedureConfig::parse(&map, &requirements).unwrap()
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(Concurrency::new(2).unwrap(), TerminationFlag::running_true())
            .unwrap()
    }

    fn undirected_graph(nodes: u64, edges: &[(u64, u64)]) -> Graph {
        let mut source = MemoryGraphSource::new(nodes);
        for &(s, t) in edges {
            source.add_relationship("REL", s, t);
        }
        let projection = GraphProjection {
            orientation: Orientation::Undirected,
            ..GraphProjection::default()
        };
        load_graph(&source, &projection).unwrap()
    }

    #[test]
    fn test_k1coloring_star() {
        let graph = undirected_graph(4, &[(0, 1), (0, 2)]);
        let output = K1Coloring
            .compute(&graph, &config_for(&K1Coloring, ConfigMap::empty()), &context())
            .unwrap();

        let NodeValues::Longs(colors) = &output.values else {
            panic!("coloring yields long values");
        };
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[0], colors[2]);
        assert_eq!(output.stats["colorCount"], 2);
        assert_eq!(output.stats["didConverge"], true);
        assert!(output.stats["ranIterations"].as_u64().unwrap() <= 2);
    }

    #[test]
    fn test_k1coloring_produces_valid_coloring_on_cycle() {
        let graph = undirected_graph(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        let output = K1Coloring
            .compute(&graph, &config_for(&K1Coloring, ConfigMap::empty()), &context())
            .unwrap();
        let NodeValues::Longs(colors) = &output.values else {
            panic!("coloring yields long values");
        };
        for node in 0..5u64 {
            for &neighbor in graph.neighbors(node) {
                assert_ne!(colors[node as usize], colors[neighbor as usize]);
            }
        }
        assert_eq!(output.stats["didConverge"], true);
    }

    #[test]
    fn test_label_propagation_two_cliques() {
        let graph = undirected_graph(
            6,
            &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)],
        );
        let output = LabelPropagation
            .compute(
                &graph,
                &config_for(&LabelPropagation, ConfigMap::empty()),
                &context(),
            )
            .unwrap();

        let NodeValues::Longs(labels) = &output.values else {
            panic!("label propagation yields long values");
        };
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(output.stats["communityCount"], 2);
        assert_eq!(output.stats["didConverge"], true);
    }

    #[test]
    fn test_label_propagation_respects_seeds() {
        let mut source = MemoryGraphSource::new(2);
        source.add_relationship("REL", 0, 1);
        source.set_node_property("seed", vec![5.0, 5.0]);
        let projection = GraphProjection {
            orientation: Orientation::Undirected,
            node_properties: vec!["seed".to_string()],
            ..GraphProjection::default()
        };
        let graph = load_graph(&source, &projection).unwrap();
        let map = ConfigMap::empty().with("seedProperty", json!("seed"));
        let output = LabelPropagation
            .compute(&graph, &config_for(&LabelPropagation, map), &context())
            .unwrap();
        assert_eq!(output.values, NodeValues::Longs(vec![5, 5]));
    }

    #[test]
    fn test_louvain_two_cliques_bridge() {
        let graph = undirected_graph(
            6,
            &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5), (2, 3)],
        );
        let output = Louvain
            .compute(&graph, &config_for(&Louvain, ConfigMap::empty()), &context())
            .unwrap();

        let NodeValues::Longs(communities) = &output.values else {
            panic!("louvain yields long values");
        };
        assert_eq!(communities[0], communities[1]);
        assert_eq!(communities[1], communities[2]);
        assert_eq!(communities[3], communities[4]);
        assert_eq!(communities[4], communities[5]);
        assert_ne!(communities[0], communities[3]);
        assert_eq!(output.stats["communityCount"], 2);
        assert!(output.stats["modularity"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_louvain_empty_adjacency_converges_immediately() {
        let graph = undirected_graph(3, &[]);
        let output = Louvain
            .compute(&graph, &config_for(&Louvain, ConfigMap::empty()), &context())
            .unwrap();
        assert_eq!(output.stats["didConverge"], true);
        assert_eq!(output.stats["communityCount"], 3);
        assert_eq!(output.stats["modularity"], 0.0);
    }

    #[test]
    fn test_louvain_accepts_sparse_seed_ids() {
        let mut source = MemoryGraphSource::new(2);
        source.add_relationship("REL", 0, 1);
        source.set_node_property("seed", vec![100.0, 200.0]);
        let projection = GraphProjection {
            orientation: Orientation::Undirected,
            node_properties: vec!["seed".to_string()],
            ..GraphProjection::default()
        };
        let graph = load_graph(&source, &projection).unwrap();
        let map = ConfigMap::empty().with("seedProperty", json!("seed"));
        let output = Louvain
            .compute(&graph, &config_for(&Louvain, map), &context())
            .unwrap();

        let NodeValues::Longs(communities) = &output.values else {
            panic!("louvain yields long values");
        };
        // seed ids are taken over, not re-indexed
        assert_eq!(communities[0], communities[1]);
        assert!(communities[0] == 100 || communities[0] == 200);
        assert_eq!(output.stats["communityCount"], 1);
    }

    #[test]
    fn test_max_iterations_zero_is_invalid() {
        let params = ConfigMap::empty().with(KEY_MAX_ITERATIONS, json!(0));
        assert!(K1Coloring.validate_params(&params).is_err());
        assert!(LabelPropagation.validate_params(&params).is_err());
        assert!(Louvain.validate_params(&params).is_err());
    }

    #[test]
    fn test_smallest_free_color() {
        assert_eq!(smallest_free_color(&[0, 1, 2], &[0, 1]), 2);
        assert_eq!(smallest_free_color(&[1, 2, 5], &[0, 1, 2]), 0);
        assert_eq!(smallest_free_color(&[0, 0, 0], &[]), 0);
    }
}
