// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Untyped configuration map
//!
//! User-supplied procedure configuration arrives as a JSON-like key/value
//! map. `ConfigMap` wraps it with typed accessors that produce descriptive
//! errors naming the offending key. `null` and the empty string normalize to
//! "absent" for optional string parameters and never satisfy a mandatory
//! parameter.

use super::error::{ConfigError, ConfigResult};
use serde_json::Value;
use std::collections::HashMap;

/// Untyped key/value configuration as received from the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    values: HashMap<String, Value>,
}

impl ConfigMap {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly used by tests and `to_map` round trips.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// A key counts as present only if it maps to a non-null value.
    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(v) if !v.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Mandatory string parameter. Absent, `null`, and `""` all fail with
    /// the mandatory-parameter error naming the key.
    pub fn require_string(&self, key: &str) -> ConfigResult<String> {
        match self.optional_string(key)? {
            Some(value) => Ok(value),
            None => Err(ConfigError::MissingValue(key.to_string())),
        }
    }

    /// Optional string parameter; `null` and `""` normalize to `None`.
    pub fn optional_string(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(key, "String", other)),
        }
    }

    /// Optional non-negative integer parameter. Fractional or non-numeric
    /// values are type errors; range checks are left to the caller.
    pub fn optional_u64(&self, key: &str) -> ConfigResult<Option<u64>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(v) => Ok(Some(v)),
                // Negative integers are reported as invalid values rather
                // than type errors so the message can show the number.
                None => match n.as_i64() {
                    Some(v) => Err(ConfigError::InvalidValue(format!(
                        "The value of `{key}` must be a non-negative integer, got {v}"
                    ))),
                    None => Err(wrong_type(key, "Integer", &Value::Number(n.clone()))),
                },
            },
            Some(other) => Err(wrong_type(key, "Integer", other)),
        }
    }

    pub fn optional_f64(&self, key: &str) -> ConfigResult<Option<f64>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(wrong_type(key, "Float", other)),
        }
    }

    pub fn optional_bool(&self, key: &str) -> ConfigResult<Option<bool>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(wrong_type(key, "Boolean", other)),
        }
    }

    /// String or list-of-strings parameter, used by projection selectors.
    pub fn optional_string_list(&self, key: &str) -> ConfigResult<Option<Vec<String>>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) if !s.is_empty() => out.push(s.clone()),
                        other => return Err(wrong_type(key, "List of String", other)),
                    }
                }
                Ok(Some(out))
            }
            Some(other) => Err(wrong_type(key, "String or List of String", other)),
        }
    }

    /// Reject every key that is not in `allowed`. Offending keys are listed
    /// in sorted order so the message is deterministic.
    pub fn require_only_keys(&self, allowed: &[&str]) -> ConfigResult<()> {
        let mut unexpected: Vec<String> = self
            .values
            .keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .cloned()
            .collect();
        if unexpected.is_empty() {
            Ok(())
        } else {
            unexpected.sort();
            Err(ConfigError::UnexpectedKeys(unexpected))
        }
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.values
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &Value) -> ConfigError {
    let actual = match actual {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(n) if n.is_f64() => "Float",
        Value::Number(_) => "Integer",
        Value::String(_) => "String",
        Value::Array(_) => "List",
        Value::Object(_) => "Map",
    };
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.to_string(),
    }
}
