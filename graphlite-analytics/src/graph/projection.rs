// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph projections
//!
//! A projection selects the subset of node labels and relationship types
//! that form the graph view an algorithm runs on, together with the
//! orientation applied to relationships while loading.

use crate::config::{ConfigError, ConfigMap, ConfigResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a projection names labels or relationship types the
/// underlying data does not contain. All offending identifiers are listed
/// in declaration order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Invalid node projection, one or more labels not found: {}", quote_join(.0))]
    LabelsNotFound(Vec<String>),

    #[error("Relationship type(s) not found: {}", quote_join(.0))]
    RelationshipTypesNotFound(Vec<String>),
}

fn quote_join(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Selects graph elements either wholesale or by an explicit name list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementSelector {
    /// Match every label / relationship type (the `*` projection).
    All,
    Include(Vec<String>),
}

impl ElementSelector {
    pub const PROJECT_ALL: &'static str = "*";

    /// Parses a selector from a string or list-of-strings configuration
    /// value; absent and `*` both mean "match all".
    pub fn from_config(map: &ConfigMap, key: &str) -> ConfigResult<Self> {
        match map.optional_string_list(key)? {
            None => Ok(ElementSelector::All),
            Some(names) if names.iter().any(|n| n == Self::PROJECT_ALL) => {
                if names.len() > 1 {
                    return Err(ConfigError::InvalidValue(format!(
                        "The value of `{key}` must not mix `*` with explicit names"
                    )));
                }
                Ok(ElementSelector::All)
            }
            Some(names) => Ok(ElementSelector::Include(names)),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            ElementSelector::All => true,
            ElementSelector::Include(names) => names.iter().any(|n| n == name),
        }
    }

    /// Selected names that are absent from `available`, in declaration order.
    pub fn missing_from<'a>(&'a self, available: &[String]) -> Vec<String> {
        match self {
            ElementSelector::All => Vec::new(),
            ElementSelector::Include(names) => names
                .iter()
                .filter(|n| !available.contains(n))
                .cloned()
                .collect(),
        }
    }

    /// Round-trip representation for `to_map`.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            ElementSelector::All => serde_json::Value::String(Self::PROJECT_ALL.to_string()),
            ElementSelector::Include(names) => serde_json::Value::Array(
                names
                    .iter()
                    .map(|n| serde_json::Value::String(n.clone()))
                    .collect(),
            ),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ElementSelector::All => Self::PROJECT_ALL.to_string(),
            ElementSelector::Include(names) => names.join(", "),
        }
    }
}

/// Direction relationships are materialized with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Natural,
    Reverse,
    Undirected,
}

impl Orientation {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.to_uppercase().as_str() {
            "NATURAL" => Ok(Orientation::Natural),
            "REVERSE" => Ok(Orientation::Reverse),
            "UNDIRECTED" => Ok(Orientation::Undirected),
            other => Err(ConfigError::InvalidValue(format!(
                "Orientation `{other}` is not supported, must be one of NATURAL, REVERSE, UNDIRECTED"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Natural => "NATURAL",
            Orientation::Reverse => "REVERSE",
            Orientation::Undirected => "UNDIRECTED",
        }
    }
}

/// The full projection under which a graph is materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphProjection {
    pub node_selector: ElementSelector,
    pub relationship_selector: ElementSelector,
    pub orientation: Orientation,
    /// Node property columns copied into the in-memory graph.
    pub node_properties: Vec<String>,
}

impl Default for GraphProjection {
    fn default() -> Self {
        Self {
            node_selector: ElementSelector::All,
            relationship_selector: ElementSelector::All,
            orientation: Orientation::Natural,
            node_properties: Vec::new(),
        }
    }
}

impl GraphProjection {
    pub const KEY_NODE_PROJECTION: &'static str = "nodeProjection";
    pub const KEY_RELATIONSHIP_PROJECTION: &'static str = "relationshipProjection";
    pub const KEY_ORIENTATION: &'static str = "orientation";
    pub const KEY_NODE_PROPERTIES: &'static str = "nodeProperties";

    pub fn config_keys() -> &'static [&'static str] {
        &[
            Self::KEY_NODE_PROJECTION,
            Self::KEY_RELATIONSHIP_PROJECTION,
            Self::KEY_ORIENTATION,
            Self::KEY_NODE_PROPERTIES,
        ]
    }

    /// Parses the inline projection keys out of a configuration map.
    /// `default_orientation` comes from the algorithm when it is not
    /// explicitly configured.
    pub fn from_config(map: &ConfigMap, default_orientation: Orientation) -> ConfigResult<Self> {
        let node_selector = ElementSelector::from_config(map, Self::KEY_NODE_PROJECTION)?;
        let relationship_selector =
            ElementSelector::from_config(map, Self::KEY_RELATIONSHIP_PROJECTION)?;
        let orientation = match map.optional_string(Self::KEY_ORIENTATION)? {
            Some(raw) => Orientation::parse(&raw)?,
            None => default_orientation,
        };
        let node_properties = map
            .optional_string_list(Self::KEY_NODE_PROPERTIES)?
            .unwrap_or_default();
        Ok(Self {
            node_selector,
            relationship_selector,
            orientation,
            node_properties,
        })
    }

    pub fn write_to_map(&self, map: &mut ConfigMap) {
        map.insert(Self::KEY_NODE_PROJECTION, self.node_selector.to_value());
        map.insert(
            Self::KEY_RELATIONSHIP_PROJECTION,
            self.relationship_selector.to_value(),
        );
        map.insert(Self::KEY_ORIENTATION, self.orientation.name());
        if !self.node_properties.is_empty() {
            map.insert(
                Self::KEY_NODE_PROPERTIES,
                serde_json::Value::Array(
                    self.node_properties
                        .iter()
                        .map(|p| serde_json::Value::String(p.clone()))
                        .collect(),
                ),
            );
        }
    }
}
