// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph views and their materialization
//!
//! Projections select labels and relationship types out of a `GraphSource`;
//! the loader turns a projection into an immutable CSR-backed `Graph` that
//! algorithms consume.

pub mod graph;
pub mod loader;
pub mod projection;
pub mod source;

pub use graph::{Graph, GraphDimensions};
pub use loader::{load_graph, LoadError};
pub use projection::{ElementSelector, GraphProjection, Orientation, ProjectionError};
pub use source::{GraphSource, MemoryGraphSource, SourceError, SourceRelationship};
