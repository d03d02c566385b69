//! Key path codec: flat dot-path maps ⇄ nested translation trees.
//!
//! Every function here is pure. Keys are processed in sorted order (the
//! natural order of [`FlatMap`]), so when two keys disagree about whether a
//! segment is a leaf or a container the outcome is reproducible: the key that
//! sorts later wins. `a.b` sorts before `a.b.c`, so a container always
//! replaces a clashing leaf.

use std::collections::BTreeMap;

use crate::error::CodecError;
use crate::types::{join_path, FlatMap, NestedTree, TreeValue};

/// A key that was left out of a conversion, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedKey {
    pub key: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The key has an empty segment.
    Malformed,
    /// Namespaced layout needs at least two segments.
    MissingNamespace,
}

impl std::fmt::Display for SkippedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            SkipReason::Malformed => write!(f, "skipping malformed key '{}'", self.key),
            SkipReason::MissingNamespace => {
                write!(f, "skipping key without namespace: '{}'", self.key)
            }
        }
    }
}

/// Per-namespace trees plus the keys that could not be placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceGroups {
    pub namespaces: BTreeMap<String, NestedTree>,
    pub skipped: Vec<SkippedKey>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A key is well formed when it has no empty segment.
pub fn validate_key(key: &str) -> Result<(), CodecError> {
    if key.split('.').any(str::is_empty) {
        return Err(CodecError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Split `flat` into its well-formed entries and the malformed keys.
pub fn partition_valid(flat: &FlatMap) -> (FlatMap, Vec<SkippedKey>) {
    let mut valid = FlatMap::new();
    let mut skipped = Vec::new();
    for (key, value) in flat {
        if validate_key(key).is_ok() {
            valid.insert(key.clone(), value.clone());
        } else {
            skipped.push(SkippedKey {
                key: key.clone(),
                reason: SkipReason::Malformed,
            });
        }
    }
    (valid, skipped)
}

// ---------------------------------------------------------------------------
// flatten / nest
// ---------------------------------------------------------------------------

/// Collapse a tree into `dot.path → value` pairs.
pub fn flatten(tree: &NestedTree) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into(tree, "", &mut out);
    out
}

fn flatten_into(tree: &NestedTree, prefix: &str, out: &mut FlatMap) {
    for (segment, value) in tree {
        let path = join_path(prefix, segment);
        match value {
            TreeValue::Leaf(text) => {
                out.insert(path, text.clone());
            }
            TreeValue::Node(child) => flatten_into(child, &path, out),
        }
    }
}

/// Expand `dot.path → value` pairs into a tree.
///
/// Fails on the first malformed key; use [`partition_valid`] first when the
/// input is untrusted and per-key warnings are wanted instead.
pub fn nest(flat: &FlatMap) -> Result<NestedTree, CodecError> {
    let mut root = NestedTree::new();
    for (key, value) in flat {
        validate_key(key)?;
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &segments, value);
    }
    Ok(root)
}

fn insert_path(root: &mut NestedTree, segments: &[&str], value: &str) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        let slot = current
            .entry((*segment).to_string())
            .or_insert_with(|| TreeValue::Node(NestedTree::new()));
        if let TreeValue::Leaf(_) = slot {
            *slot = TreeValue::Node(NestedTree::new());
        }
        current = match slot {
            TreeValue::Node(child) => child,
            TreeValue::Leaf(_) => return,
        };
    }
    current.insert((*last).to_string(), TreeValue::Leaf(value.to_string()));
}

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// Partition keys by first segment and nest the remainder of each key.
///
/// Single-segment and malformed keys cannot be placed in a namespace file;
/// they are reported in [`NamespaceGroups::skipped`].
pub fn group_by_namespace(flat: &FlatMap) -> NamespaceGroups {
    let (valid, mut skipped) = partition_valid(flat);

    let mut partitions: BTreeMap<String, FlatMap> = BTreeMap::new();
    for (key, value) in valid {
        match key.split_once('.') {
            Some((namespace, rest)) => {
                partitions
                    .entry(namespace.to_string())
                    .or_default()
                    .insert(rest.to_string(), value);
            }
            None => skipped.push(SkippedKey {
                key,
                reason: SkipReason::MissingNamespace,
            }),
        }
    }

    let mut namespaces = BTreeMap::new();
    for (namespace, inner) in partitions {
        let mut tree = NestedTree::new();
        for (key, value) in &inner {
            let segments: Vec<&str> = key.split('.').collect();
            insert_path(&mut tree, &segments, value);
        }
        namespaces.insert(namespace, tree);
    }

    skipped.sort_by(|a, b| a.key.cmp(&b.key));
    NamespaceGroups {
        namespaces,
        skipped,
    }
}

/// Flatten every namespace tree and prefix its keys with the namespace.
pub fn ungroup_namespaces(namespaces: &BTreeMap<String, NestedTree>) -> FlatMap {
    let mut out = FlatMap::new();
    for (namespace, tree) in namespaces {
        flatten_into(tree, namespace, &mut out);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
