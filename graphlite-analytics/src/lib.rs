// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GraphLite Analytics - in-memory graph algorithm execution engine
//!
//! The execution core of an in-memory graph-analytics engine: community
//! detection and connectivity algorithms run over graphs materialized from
//! a property graph store, behind a pipeline that validates untyped user
//! configuration, resolves graphs through a named catalog, refuses runs
//! whose estimated memory exceeds the available budget, and executes with
//! bounded concurrency.
//!
//! # Usage
//!
//! ```ignore
//! use graphlite_analytics::{AnalyticsEngine, ConfigMap, MemoryGraphSource};
//! use std::sync::Arc;
//!
//! let mut source = MemoryGraphSource::new(4);
//! source.add_relationship("KNOWS", 0, 1);
//! let engine = AnalyticsEngine::new(Arc::new(source));
//!
//! let config = ConfigMap::empty().with("graph", "myGraph");
//! engine.graph_project("myGraph", &ConfigMap::empty())?;
//! for row in engine.run("wcc.stream", &config)?.into_rows().unwrap() {
//!     println!("{} -> {:?}", row.node_id, row.value);
//! }
//! # Ok::<(), graphlite_analytics::ExecutionError>(())
//! ```

pub mod algorithms;
pub mod catalog;
pub mod collections;
pub mod config;
pub mod exec;
pub mod graph;
pub mod mem;

// Re-export the embedding API - AnalyticsEngine is the main entry point
pub use catalog::{CatalogError, GraphCatalog, GraphInfo};
pub use config::{ConfigError, ConfigMap};
pub use exec::{
    AnalyticsEngine, EstimateRow, ExecutionError, NodeValue, ProcedureOutput, StreamRow,
    SummaryRow, TerminationFlag,
};
pub use graph::{GraphSource, MemoryGraphSource, Orientation};
pub use mem::{human_readable, MemoryGuard};

/// GraphLite Analytics version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GraphLite Analytics crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
