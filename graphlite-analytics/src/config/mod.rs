// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration model
//!
//! Translates untyped user configuration maps into validated, immutable
//! procedure configurations composed from orthogonal facets.

pub mod error;
pub mod facets;
pub mod map;

pub use error::{ConfigError, ConfigResult, ValidationCollector};
pub use facets::{
    Concurrency, FacetRequirements, GraphSelector, ProcedureConfig, WriteFacet, KEY_CONCURRENCY,
    KEY_GRAPH, KEY_NODE_LABELS, KEY_RELATIONSHIP_TYPES, KEY_SEED_PROPERTY, KEY_WRITE_CONCURRENCY,
    KEY_WRITE_PROPERTY,
};
pub use map::ConfigMap;
