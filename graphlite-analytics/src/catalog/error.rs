// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the graph catalog

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("A graph with name '{0}' already exists.")]
    GraphAlreadyExists(String),

    #[error("Graph with name '{name}' does not exist on database '{database}'. It might exist on another database.")]
    GraphNotFound { name: String, database: String },

    #[error("The graph name must not be empty.")]
    EmptyGraphName,
}

pub type CatalogResult<T> = Result<T, CatalogError>;
