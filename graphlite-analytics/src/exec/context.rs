// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-invocation execution context
//!
//! Bundles the bounded worker pool, the cooperative termination flag and
//! the job id of a single procedure invocation. Algorithms receive the
//! context and are expected to check the flag periodically so a cancelled
//! invocation stops within a bounded number of work units.

use crate::config::Concurrency;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// How many work units may pass between two termination checks.
pub const RUN_CHECK_NODE_COUNT: usize = 10_000;

/// Raised when a run observes its termination flag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("The execution has been terminated.")]
pub struct TerminatedError;

/// Shared cancellation signal, checked cooperatively by compute phases.
#[derive(Debug, Clone)]
pub struct TerminationFlag {
    running: Arc<AtomicBool>,
}

impl Default for TerminationFlag {
    fn default() -> Self {
        Self::running_true()
    }
}

impl TerminationFlag {
    pub fn running_true() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Signals the owning invocation to stop at its next check.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn assert_running(&self) -> Result<(), TerminatedError> {
        if self.running() {
            Ok(())
        } else {
            Err(TerminatedError)
        }
    }
}

/// Wall-clock phase timer; phases record elapsed milliseconds.
#[derive(Debug)]
pub struct ProgressTimer {
    started: Instant,
}

impl ProgressTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Execution context of one invocation.
pub struct ExecutionContext {
    concurrency: Concurrency,
    pool: rayon::ThreadPool,
    termination: TerminationFlag,
    job_id: Uuid,
}

impl ExecutionContext {
    /// Builds a context with a dedicated worker pool of exactly
    /// `concurrency` threads. Compute and write-back fan out on this pool
    /// and never beyond it.
    pub fn new(
        concurrency: Concurrency,
        termination: TerminationFlag,
    ) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.get())
            .build()?;
        Ok(Self {
            concurrency,
            pool,
            termination,
            job_id: Uuid::new_v4(),
        })
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    pub fn termination(&self) -> &TerminationFlag {
        &self.termination
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Runs `op` inside the bounded pool.
    pub fn run<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}
