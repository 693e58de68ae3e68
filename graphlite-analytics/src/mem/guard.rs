// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memory admission control
//!
//! Before an algorithm is allowed to run, its estimated minimum memory is
//! checked against the currently available budget. The check runs once,
//! strictly before any algorithm-specific allocation, and a failed check
//! leaves nothing allocated. It is advisory-but-blocking: it is not
//! re-checked mid-run.

use super::range::human_readable;
use super::tree::MemoryTree;
use std::sync::Arc;
use thiserror::Error;

/// Admission failure, carrying both figures for the caller.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "Procedure was blocked since minimum estimated memory ({}) exceeds current free memory ({}).",
    human_readable(*.required_min),
    human_readable(*.available)
)]
pub struct MemoryExhaustedError {
    pub required_min: u64,
    pub available: u64,
}

type AvailableBytes = dyn Fn() -> u64 + Send + Sync;

/// Supplies the free-memory figure and performs the admission check.
#[derive(Clone)]
pub struct MemoryGuard {
    available_bytes: Arc<AvailableBytes>,
}

impl MemoryGuard {
    pub fn new(available_bytes: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        Self {
            available_bytes: Arc::new(available_bytes),
        }
    }

    /// A guard that admits everything; the default for embedded use where
    /// no budget has been configured.
    pub fn unlimited() -> Self {
        Self::new(|| u64::MAX)
    }

    /// A fixed budget in bytes.
    pub fn fixed(budget: u64) -> Self {
        Self::new(move || budget)
    }

    /// Admits `tree` if the available budget covers its minimum estimate.
    pub fn check(&self, tree: &MemoryTree) -> Result<(), MemoryExhaustedError> {
        let required_min = tree.memory_usage().min();
        let available = (self.available_bytes)();
        if required_min > available {
            return Err(MemoryExhaustedError {
                required_min,
                available,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryGuard")
            .field("available", &(self.available_bytes)())
            .finish()
    }
}
