// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memory estimation and admission
//!
//! Estimation is a pure function of configuration and graph dimensions; no
//! real data structures are allocated while estimating. The resulting cost
//! tree feeds both the user-facing breakdown and the pre-flight admission
//! check.

pub mod guard;
pub mod range;
pub mod sizes;
pub mod tree;

pub use guard::{MemoryExhaustedError, MemoryGuard};
pub use range::{human_readable, MemoryRange};
pub use tree::{MemoryEstimationBuilder, MemoryTree};
