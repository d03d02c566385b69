//! Domain types for translation data.
//!
//! Flat maps and trees use `BTreeMap` so every traversal, and every file the
//! orchestrator writes, follows sorted key order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

/// Full dot-path key → value for exactly one locale.
pub type FlatMap = BTreeMap<String, String>;

/// Locale code → that locale's [`FlatMap`].
pub type LocaleSet = BTreeMap<String, FlatMap>;

/// One level of a nested translation document.
pub type NestedTree = BTreeMap<String, TreeValue>;

// ---------------------------------------------------------------------------
// Tree values
// ---------------------------------------------------------------------------

/// A node in a nested translation document: either a translated string or a
/// further level of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    Leaf(String),
    Node(NestedTree),
}

impl TreeValue {
    pub fn as_node(&self) -> Option<&NestedTree> {
        match self {
            TreeValue::Node(tree) => Some(tree),
            TreeValue::Leaf(_) => None,
        }
    }

    /// Convert an arbitrary JSON value found at `path`.
    ///
    /// Numbers and booleans become their string form. `null` and arrays have
    /// no translation meaning and are rejected rather than dropped.
    pub fn from_json(value: Value, path: &str) -> Result<Self, CodecError> {
        match value {
            Value::String(s) => Ok(TreeValue::Leaf(s)),
            Value::Number(n) => Ok(TreeValue::Leaf(n.to_string())),
            Value::Bool(b) => Ok(TreeValue::Leaf(b.to_string())),
            Value::Object(map) => object_to_tree(map, path).map(TreeValue::Node),
            Value::Null => Err(CodecError::UnsupportedValue {
                path: path.to_string(),
                kind: "null",
            }),
            Value::Array(_) => Err(CodecError::UnsupportedValue {
                path: path.to_string(),
                kind: "array",
            }),
        }
    }
}

/// Parse a translation document (the whole file) into a [`NestedTree`].
pub fn tree_from_json(value: Value) -> Result<NestedTree, CodecError> {
    match value {
        Value::Object(map) => object_to_tree(map, ""),
        other => Err(CodecError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

fn object_to_tree(
    map: serde_json::Map<String, Value>,
    path: &str,
) -> Result<NestedTree, CodecError> {
    let mut tree = NestedTree::new();
    for (segment, child) in map {
        let child_path = join_path(path, &segment);
        tree.insert(segment, TreeValue::from_json(child, &child_path)?);
    }
    Ok(tree)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
