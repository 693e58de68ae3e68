// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution pipeline
//!
//! Orchestrates configuration validation, graph resolution, memory
//! admission, bounded-concurrency compute, optional write-back and result
//! emission.

pub mod context;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod result;

pub use context::{ExecutionContext, ProgressTimer, TerminatedError, TerminationFlag};
pub use engine::AnalyticsEngine;
pub use error::{ExecutionError, ExecutionResult};
pub use pipeline::{ExecutionMode, ProcedureRunner};
pub use registry::{register_all, ProcedureRegistry};
pub use result::{
    EstimateRow, NodeValue, ProcedureOutput, ResultStream, StreamRow, SummaryRow, Timings,
};
