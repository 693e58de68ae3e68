// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed procedure configuration
//!
//! A procedure configuration is composed from orthogonal facets: the base
//! facet (graph selection and concurrency), the seed facet and the write
//! facet. Each facet validates independently; failures are aggregated so a
//! caller sees every problem in one error. Validation is total: once a
//! `ProcedureConfig` exists it is fully valid and immutable.
//!
//! Unknown-key policy (strict, per facet): the set of recognized keys is
//! the union of the base keys for the chosen graph-selection form, the mode
//! keys (write), the seed key when the algorithm supports seeding, and the
//! keys the algorithm declares. Everything else is rejected.

use super::error::{ConfigError, ConfigResult, ValidationCollector};
use super::map::ConfigMap;
use crate::graph::{ElementSelector, GraphProjection, Orientation};
use once_cell::sync::Lazy;

pub const KEY_GRAPH: &str = "graph";
pub const KEY_NODE_LABELS: &str = "nodeLabels";
pub const KEY_RELATIONSHIP_TYPES: &str = "relationshipTypes";
pub const KEY_CONCURRENCY: &str = "concurrency";
pub const KEY_SEED_PROPERTY: &str = "seedProperty";
pub const KEY_WRITE_PROPERTY: &str = "writeProperty";
pub const KEY_WRITE_CONCURRENCY: &str = "writeConcurrency";

static AVAILABLE_PARALLELISM: Lazy<usize> = Lazy::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
});

/// A validated, positive worker count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(usize);

impl Concurrency {
    pub fn new(value: usize) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Default concurrency: the host's available parallelism.
    pub fn available() -> Self {
        Self(*AVAILABLE_PARALLELISM)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    fn from_config(map: &ConfigMap, key: &str, default: Concurrency) -> ConfigResult<Self> {
        match map.optional_u64(key)? {
            None => Ok(default),
            Some(0) => Err(ConfigError::InvalidValue(format!(
                "The value of `{key}` must be a positive integer, got 0"
            ))),
            Some(value) => Ok(Self(value as usize)),
        }
    }
}

/// How the graph an algorithm runs on is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphSelector {
    /// A named entry in the graph catalog, optionally narrowed to a subset
    /// of its labels and relationship types.
    Catalog {
        graph_name: String,
        node_labels: ElementSelector,
        relationship_types: ElementSelector,
    },
    /// An ephemeral, catalog-bypassing projection materialized per run.
    Inline(GraphProjection),
}

/// Write facet: target property plus dedicated write concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteFacet {
    pub write_property: String,
    pub write_concurrency: Concurrency,
}

/// What a procedure requires of its configuration; assembled by the
/// pipeline from the execution mode and the algorithm's declarations.
#[derive(Debug, Clone, Copy)]
pub struct FacetRequirements {
    pub write_mode: bool,
    pub supports_seeding: bool,
    /// Algorithm-specific keys passed through untouched.
    pub algorithm_keys: &'static [&'static str],
    pub default_orientation: Orientation,
}

/// Fully validated procedure configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureConfig {
    pub selector: GraphSelector,
    pub concurrency: Concurrency,
    pub seed_property: Option<String>,
    pub write: Option<WriteFacet>,
    /// Algorithm-specific keys, validated against the declared key set but
    /// otherwise untouched.
    pub algorithm_params: ConfigMap,
}

impl ProcedureConfig {
    /// Validates `map` against `requirements`. All facet validators run;
    /// every failure is reported, not only the first.
    pub fn parse(map: &ConfigMap, requirements: &FacetRequirements) -> ConfigResult<Self> {
        let mut collector = ValidationCollector::new();

        let selector = collector.check(parse_selector(map, requirements));
        let concurrency =
            collector.check(Concurrency::from_config(map, KEY_CONCURRENCY, Concurrency::available()));

        let seed_property = if requirements.supports_seeding {
            collector.check(map.optional_string(KEY_SEED_PROPERTY)).flatten()
        } else {
            None
        };

        let write = if requirements.write_mode {
            let property = collector.check(map.require_string(KEY_WRITE_PROPERTY));
            let write_concurrency = collector.check(Concurrency::from_config(
                map,
                KEY_WRITE_CONCURRENCY,
                concurrency.unwrap_or_else(Concurrency::available),
            ));
            match (property, write_concurrency) {
                (Some(write_property), Some(write_concurrency)) => Some(WriteFacet {
                    write_property,
                    write_concurrency,
                }),
                _ => None,
            }
        } else {
            None
        };

        collector.check(check_recognized_keys(map, requirements));

        let mut algorithm_params = ConfigMap::empty();
        for key in requirements.algorithm_keys {
            if let Some(value) = map.get(key) {
                algorithm_params.insert(key, value.clone());
            }
        }

        collector.finish()?;

        Ok(Self {
            // Both unwraps are guarded by the collector: a `None` here
            // implies a recorded error and `finish` has already returned it.
            selector: selector.expect("validated"),
            concurrency: concurrency.expect("validated"),
            seed_property,
            write,
            algorithm_params,
        })
    }

    /// Lossless round trip back to an untyped map; re-validating the result
    /// yields an equal configuration.
    pub fn to_map(&self) -> ConfigMap {
        let mut map = ConfigMap::empty();
        match &self.selector {
            GraphSelector::Catalog {
                graph_name,
                node_labels,
                relationship_types,
            } => {
                map.insert(KEY_GRAPH, graph_name.as_str());
                map.insert(KEY_NODE_LABELS, node_labels.to_value());
                map.insert(KEY_RELATIONSHIP_TYPES, relationship_types.to_value());
            }
            GraphSelector::Inline(projection) => projection.write_to_map(&mut map),
        }
        map.insert(KEY_CONCURRENCY, self.concurrency.get() as u64);
        if let Some(seed) = &self.seed_property {
            map.insert(KEY_SEED_PROPERTY, seed.as_str());
        }
        if let Some(write) = &self.write {
            map.insert(KEY_WRITE_PROPERTY, write.write_property.as_str());
            map.insert(KEY_WRITE_CONCURRENCY, write.write_concurrency.get() as u64);
        }
        for key in self.algorithm_params.keys() {
            if let Some(value) = self.algorithm_params.get(key) {
                map.insert(key, value.clone());
            }
        }
        map
    }
}

fn parse_selector(map: &ConfigMap, requirements: &FacetRequirements) -> ConfigResult<GraphSelector> {
    if map.contains_key(KEY_GRAPH) {
        Ok(GraphSelector::Catalog {
            graph_name: map.require_string(KEY_GRAPH)?,
            node_labels: ElementSelector::from_config(map, KEY_NODE_LABELS)?,
            relationship_types: ElementSelector::from_config(map, KEY_RELATIONSHIP_TYPES)?,
        })
    } else {
        Ok(GraphSelector::Inline(GraphProjection::from_config(
            map,
            requirements.default_orientation,
        )?))
    }
}

fn check_recognized_keys(map: &ConfigMap, requirements: &FacetRequirements) -> ConfigResult<()> {
    let mut allowed: Vec<&str> = vec![KEY_CONCURRENCY];
    if map.contains_key(KEY_GRAPH) {
        allowed.extend([KEY_GRAPH, KEY_NODE_LABELS, KEY_RELATIONSHIP_TYPES]);
    } else {
        allowed.extend(GraphProjection::config_keys());
    }
    if requirements.supports_seeding {
        allowed.push(KEY_SEED_PROPERTY);
    }
    if requirements.write_mode {
        allowed.extend([KEY_WRITE_PROPERTY, KEY_WRITE_CONCURRENCY]);
    }
    allowed.extend(requirements.algorithm_keys);
    map.require_only_keys(&allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stream_requirements() -> FacetRequirements {
        FacetRequirements {
            write_mode: false,
            supports_seeding: true,
            algorithm_keys: &["maxIterations"],
            default_orientation: Orientation::Undirected,
        }
    }

    fn write_requirements() -> FacetRequirements {
        FacetRequirements {
            write_mode: true,
            ..stream_requirements()
        }
    }

    #[test]
    fn test_defaults_for_empty_map() {
        let config = ProcedureConfig::parse(&ConfigMap::empty(), &stream_requirements()).unwrap();
        assert_eq!(config.concurrency, Concurrency::available());
        assert_eq!(config.seed_property, None);
        assert!(config.write.is_none());
        assert!(matches!(config.selector, GraphSelector::Inline(_)));
    }

    #[test]
    fn test_missing_write_property_names_the_key() {
        let error =
            ProcedureConfig::parse(&ConfigMap::empty(), &write_requirements()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "No value specified for the mandatory configuration parameter `writeProperty`"
        );
    }

    #[test]
    fn test_empty_write_property_is_still_missing() {
        let map = ConfigMap::empty().with(KEY_WRITE_PROPERTY, json!(""));
        let error = ProcedureConfig::parse(&map, &write_requirements()).unwrap_err();
        assert!(error.to_string().contains("`writeProperty`"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let map = ConfigMap::empty().with(KEY_CONCURRENCY, json!(0));
        let error = ProcedureConfig::parse(&map, &stream_requirements()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "The value of `concurrency` must be a positive integer, got 0"
        );
    }

    #[test]
    fn test_all_facet_failures_surface_together() {
        let map = ConfigMap::empty().with(KEY_CONCURRENCY, json!(0));
        let error = ProcedureConfig::parse(&map, &write_requirements()).unwrap_err();
        let message = error.to_string();
        assert!(message.starts_with("Multiple errors in configuration arguments:"));
        assert!(message.contains("`writeProperty`"));
        assert!(message.contains("`concurrency`"));
    }

    #[test]
    fn test_write_concurrency_defaults_to_concurrency() {
        let map = ConfigMap::empty()
            .with(KEY_CONCURRENCY, json!(3))
            .with(KEY_WRITE_PROPERTY, json!("community"));
        let config = ProcedureConfig::parse(&map, &write_requirements()).unwrap();
        assert_eq!(config.write.unwrap().write_concurrency.get(), 3);
    }

    #[test]
    fn test_seed_property_null_is_absent() {
        let map = ConfigMap::empty().with(KEY_SEED_PROPERTY, json!(null));
        let config = ProcedureConfig::parse(&map, &stream_requirements()).unwrap();
        assert_eq!(config.seed_property, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let map = ConfigMap::empty().with("sudo", json!(true));
        let error = ProcedureConfig::parse(&map, &stream_requirements()).unwrap_err();
        assert_eq!(error.to_string(), "Unexpected configuration key(s): sudo");
    }

    #[test]
    fn test_projection_keys_rejected_when_catalog_graph_named() {
        let map = ConfigMap::empty()
            .with(KEY_GRAPH, json!("myGraph"))
            .with("nodeProjection", json!("A"));
        let error = ProcedureConfig::parse(&map, &stream_requirements()).unwrap_err();
        assert!(error.to_string().contains("nodeProjection"));
    }

    #[test]
    fn test_algorithm_params_pass_through() {
        let map = ConfigMap::empty().with("maxIterations", json!(5));
        let config = ProcedureConfig::parse(&map, &stream_requirements()).unwrap();
        assert_eq!(
            config.algorithm_params.optional_u64("maxIterations").unwrap(),
            Some(5)
        );
    }

    #[test]
    fn test_to_map_round_trip_is_idempotent() {
        let map = ConfigMap::empty()
            .with(KEY_GRAPH, json!("myGraph"))
            .with(KEY_CONCURRENCY, json!(2))
            .with(KEY_SEED_PROPERTY, json!("seed"))
            .with(KEY_WRITE_PROPERTY, json!("community"))
            .with("maxIterations", json!(7));
        let requirements = write_requirements();

        let first = ProcedureConfig::parse(&map, &requirements).unwrap();
        let second = ProcedureConfig::parse(&first.to_map(), &requirements).unwrap();
        assert_eq!(first, second);
    }
}
