// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error taxonomy
//!
//! Every failure class of the pipeline, wrapped so transports can unwrap to
//! the root cause. Nothing here is retried: all validation runs before
//! expensive work starts, so the pipeline is fail-fast by design.

use crate::algorithms::AlgorithmError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::exec::context::TerminatedError;
use crate::graph::loader::LoadError;
use crate::graph::{ProjectionError, SourceError};
use crate::mem::MemoryExhaustedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("Seed property `{property}` not found in graph with node properties: [{}]", .available.join(", "))]
    SeedPropertyNotFound {
        property: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Resource(#[from] MemoryExhaustedError),

    #[error("Procedure `{procedure}` writes results, but the connected graph source is read-only")]
    ReadOnlyViolation { procedure: String },

    #[error(transparent)]
    Terminated(#[from] TerminatedError),

    #[error("Procedure not found: `{0}`")]
    ProcedureNotFound(String),

    #[error("Failed to initialize worker pool: {0}")]
    WorkerPool(String),
}

impl From<LoadError> for ExecutionError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::Projection(e) => ExecutionError::Projection(e),
            LoadError::Source(e) => ExecutionError::Source(e),
        }
    }
}

impl From<AlgorithmError> for ExecutionError {
    fn from(error: AlgorithmError) -> Self {
        match error {
            AlgorithmError::Terminated(e) => ExecutionError::Terminated(e),
            AlgorithmError::Config(e) => ExecutionError::Config(e),
        }
    }
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_property_message_lists_available() {
        let error = ExecutionError::SeedPropertyNotFound {
            property: "foo".to_string(),
            available: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Seed property `foo` not found in graph with node properties: [a, b, c]"
        );
    }

    #[test]
    fn test_wrapped_errors_surface_verbatim() {
        let config: ExecutionError = ConfigError::MissingValue("writeProperty".to_string()).into();
        assert_eq!(
            config.to_string(),
            "No value specified for the mandatory configuration parameter `writeProperty`"
        );
    }
}
