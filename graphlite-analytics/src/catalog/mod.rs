// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Named-graph catalog
//!
//! Process-wide registry of materialized graphs, keyed by owner and name.

pub mod error;
pub mod registry;

pub use error::{CatalogError, CatalogResult};
pub use registry::{CatalogEntry, CatalogKey, GraphCatalog, GraphInfo};
