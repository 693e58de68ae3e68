// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure registry
//!
//! Explicit registration table mapping operation names to algorithm units.
//! Registering an algorithm creates its full operation family at once --
//! `<name>.stream`, `<name>.write` and their `.estimate` siblings -- so
//! compute and estimate operations are in bijection by construction.

use super::pipeline::ExecutionMode;
use crate::algorithms::Algorithm;
use std::collections::HashMap;
use std::sync::Arc;

pub const ESTIMATE_SUFFIX: &str = ".estimate";

/// What one registered operation name resolves to.
#[derive(Clone)]
pub struct ProcedureEntry {
    pub algorithm: Arc<dyn Algorithm>,
    pub mode: ExecutionMode,
    pub estimate: bool,
}

/// Operation-name table for all algorithm procedures.
#[derive(Default)]
pub struct ProcedureRegistry {
    entries: HashMap<String, ProcedureEntry>,
}

impl ProcedureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the stream/write operation family of `algorithm`.
    pub fn register(&mut self, algorithm: Arc<dyn Algorithm>) {
        for mode in [ExecutionMode::Stream, ExecutionMode::Write] {
            let name = format!("{}.{}", algorithm.name(), mode.name());
            self.entries.insert(
                format!("{name}{ESTIMATE_SUFFIX}"),
                ProcedureEntry {
                    algorithm: algorithm.clone(),
                    mode,
                    estimate: true,
                },
            );
            self.entries.insert(
                name,
                ProcedureEntry {
                    algorithm: algorithm.clone(),
                    mode,
                    estimate: false,
                },
            );
        }
        log::debug!("Registered procedure family for {}", algorithm.name());
    }

    pub fn get(&self, operation: &str) -> Option<&ProcedureEntry> {
        self.entries.get(operation)
    }

    /// All registered operation names, sorted.
    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full built-in algorithm set.
pub fn register_all() -> ProcedureRegistry {
    use crate::algorithms::{DegreeCentrality, K1Coloring, LabelPropagation, Louvain, PageRank, Wcc};

    let mut registry = ProcedureRegistry::new();
    registry.register(Arc::new(Wcc));
    registry.register(Arc::new(K1Coloring));
    registry.register(Arc::new(LabelPropagation));
    registry.register(Arc::new(Louvain));
    registry.register(Arc::new(DegreeCentrality));
    registry.register(Arc::new(PageRank));
    registry
}
