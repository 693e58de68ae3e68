// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Procedure results
//!
//! Stream invocations yield a finite, single-pass sequence of per-node
//! rows; write invocations yield one aggregate summary row; estimate
//! invocations yield the memory record. All timings are reported in
//! milliseconds and are present whenever the corresponding phase executed.

use crate::algorithms::NodeValues;
use serde::Serialize;
use serde_json::{Map, Value};

/// A single algorithm output value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeValue {
    Long(u64),
    Double(f64),
}

impl NodeValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            NodeValue::Long(v) => *v as f64,
            NodeValue::Double(v) => *v,
        }
    }

    pub fn as_long(&self) -> Option<u64> {
        match self {
            NodeValue::Long(v) => Some(*v),
            NodeValue::Double(_) => None,
        }
    }
}

/// One stream-mode row: node id plus the algorithm's primary output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreamRow {
    pub node_id: u64,
    pub value: NodeValue,
}

/// Lazy, single-pass row sequence over a computed result column. Not
/// restartable; once drained it stays empty.
#[derive(Debug)]
pub struct ResultStream {
    values: NodeValues,
    cursor: usize,
}

impl ResultStream {
    pub(crate) fn new(values: NodeValues) -> Self {
        Self { values, cursor: 0 }
    }
}

impl Iterator for ResultStream {
    type Item = StreamRow;

    fn next(&mut self) -> Option<StreamRow> {
        let node_id = self.cursor as u64;
        let value = match &self.values {
            NodeValues::Longs(v) => NodeValue::Long(*v.get(self.cursor)?),
            NodeValues::Doubles(v) => NodeValue::Double(*v.get(self.cursor)?),
        };
        self.cursor += 1;
        Some(StreamRow { node_id, value })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len().saturating_sub(self.cursor);
        (remaining, Some(remaining))
    }
}

/// Phase timings of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
    pub create_millis: u64,
    pub compute_millis: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_millis: Option<u64>,
}

/// Aggregate summary row of a write-mode invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub node_count: u64,
    pub relationship_count: u64,
    pub create_millis: u64,
    pub compute_millis: u64,
    pub write_millis: u64,
    pub node_properties_written: u64,
    /// Algorithm statistics, e.g. `componentCount`, `ranIterations`.
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

impl SummaryRow {
    pub fn stat(&self, key: &str) -> Option<&Value> {
        self.stats.get(key)
    }
}

/// Result record of an estimation entry point.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRow {
    pub node_count: u64,
    pub relationship_count: u64,
    pub required_memory: String,
    pub bytes_min: u64,
    pub bytes_max: u64,
    pub tree_view: String,
}

/// What a procedure invocation emits.
#[derive(Debug)]
pub enum ProcedureOutput {
    Stream { timings: Timings, rows: ResultStream },
    Summary(SummaryRow),
    Estimate(EstimateRow),
}

impl ProcedureOutput {
    pub fn into_rows(self) -> Option<ResultStream> {
        match self {
            ProcedureOutput::Stream { rows, .. } => Some(rows),
            _ => None,
        }
    }

    pub fn into_summary(self) -> Option<SummaryRow> {
        match self {
            ProcedureOutput::Summary(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_estimate(self) -> Option<EstimateRow> {
        match self {
            ProcedureOutput::Estimate(row) => Some(row),
            _ => None,
        }
    }
}
