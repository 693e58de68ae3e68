// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Configuration error types

use thiserror::Error;

/// Errors produced while turning an untyped configuration map into a typed
/// procedure configuration.
///
/// Every variant carries the exact key or message that should surface to the
/// caller verbatim; configuration errors are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("No value specified for the mandatory configuration parameter `{0}`")]
    MissingValue(String),

    #[error("The value of `{key}` must be of type {expected} but was {actual}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: String,
    },

    #[error("{0}")]
    InvalidValue(String),

    #[error("Unexpected configuration key(s): {}", .0.join(", "))]
    UnexpectedKeys(Vec<String>),

    #[error("Multiple errors in configuration arguments:{}", render_all(.0))]
    Multiple(Vec<ConfigError>),
}

fn render_all(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n\t\t\t{e}"))
        .collect::<String>()
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Collects facet validation failures so that every problem in a
/// configuration surfaces at once instead of only the first one.
#[derive(Debug, Default)]
pub struct ValidationCollector {
    errors: Vec<ConfigError>,
}

impl ValidationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed check, returning the value of a successful one.
    pub fn check<T>(&mut self, result: ConfigResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn push(&mut self, error: ConfigError) {
        // Nested aggregates are flattened so the final message lists
        // individual failures only.
        match error {
            ConfigError::Multiple(inner) => self.errors.extend(inner),
            other => self.errors.push(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resolve to a single error: none, the sole failure, or an aggregate.
    pub fn finish(mut self) -> ConfigResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ConfigError::Multiple(self.errors)),
        }
    }
}
