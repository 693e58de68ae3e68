// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Memory cost trees
//!
//! An estimation is a tree of named components, each contributing a byte
//! range. Parents aggregate children by summation, and the rendered view
//! nests components so a user can see where an estimate comes from:
//!
//! ```text
//! WCC: [802 Bytes ... 1602 Bytes]
//! |-- disjoint set structure: 802 Bytes
//!     |-- parents: 624 Bytes
//! ```

use super::range::MemoryRange;
use crate::graph::GraphDimensions;

/// A named node in the memory cost breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTree {
    description: String,
    range: MemoryRange,
    components: Vec<MemoryTree>,
}

impl MemoryTree {
    pub fn leaf(description: impl Into<String>, range: MemoryRange) -> Self {
        Self {
            description: description.into(),
            range,
            components: Vec::new(),
        }
    }

    /// A parent whose range is the sum of its children.
    pub fn composite(description: impl Into<String>, components: Vec<MemoryTree>) -> Self {
        let range = components
            .iter()
            .fold(MemoryRange::empty(), |acc, c| acc + c.range);
        Self {
            description: description.into(),
            range,
            components,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn memory_usage(&self) -> MemoryRange {
        self.range
    }

    pub fn components(&self) -> &[MemoryTree] {
        &self.components
    }

    /// Nested human-readable view. Deterministic for a given tree.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 1..depth {
            out.push_str("    ");
        }
        if depth > 0 {
            out.push_str("|-- ");
        }
        out.push_str(&self.description);
        out.push_str(": ");
        out.push_str(&self.range.to_string());
        out.push('\n');
        for component in &self.components {
            component.render_into(out, depth + 1);
        }
    }
}

/// Builder assembling an algorithm's estimation from per-node, per-thread
/// and fixed components. Per-thread components scale with the concurrency
/// value, never with the node count.
#[derive(Debug)]
pub struct MemoryEstimationBuilder {
    description: String,
    components: Vec<MemoryTree>,
}

impl MemoryEstimationBuilder {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            components: Vec::new(),
        }
    }

    pub fn fixed(mut self, description: &str, bytes: u64) -> Self {
        self.components
            .push(MemoryTree::leaf(description, MemoryRange::of(bytes)));
        self
    }

    pub fn range(mut self, description: &str, range: MemoryRange) -> Self {
        self.components.push(MemoryTree::leaf(description, range));
        self
    }

    pub fn per_node(mut self, description: &str, dims: &GraphDimensions, bytes_per_node: u64) -> Self {
        self.components.push(MemoryTree::leaf(
            description,
            MemoryRange::of(dims.node_count * bytes_per_node),
        ));
        self
    }

    pub fn per_thread(mut self, description: &str, concurrency: usize, bytes_per_thread: u64) -> Self {
        self.components.push(MemoryTree::leaf(
            description,
            MemoryRange::of(bytes_per_thread).times(concurrency as u64),
        ));
        self
    }

    pub fn component(mut self, component: MemoryTree) -> Self {
        self.components.push(component);
        self
    }

    pub fn build(self) -> MemoryTree {
        MemoryTree::composite(self.description, self.components)
    }
}
