//! Diff & merge engine.
//!
//! Pure functions over flat maps and trees. The only merge policy is
//! remote-wins: on a conflicting value the remote side overwrites the local
//! one, and keys that exist only locally are kept.

use std::collections::BTreeMap;

use i18nflow_core::{FlatMap, NestedTree, TreeValue};

/// Key-level difference between two flat maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// In `target`, not in `source`.
    pub added: Vec<String>,
    /// In `source`, not in `target`.
    pub removed: Vec<String>,
    /// In both, values differ.
    pub modified: Vec<String>,
    /// In both, values equal.
    pub unchanged: Vec<String>,
}

impl DiffResult {
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// The two values of a key edited on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub local: String,
    pub remote: String,
}

/// Informational summary of reconciling `local` with `remote`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub diff: DiffResult,
    pub conflicts: BTreeMap<String, Conflict>,
    /// Remote-only keys with their values.
    pub incoming: FlatMap,
    /// Local-only keys with their values; the merge keeps them.
    pub local_only: FlatMap,
}

/// Counts reported for one reconciled file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub conflicts: usize,
    pub unchanged: usize,
    pub local_only: usize,
}

impl MergeStats {
    pub fn from_report(report: &MergeReport) -> Self {
        Self {
            added: report.diff.added.len(),
            conflicts: report.conflicts.len(),
            unchanged: report.diff.unchanged.len(),
            local_only: report.diff.removed.len(),
        }
    }

    /// Force mode: every incoming key counts as added.
    pub fn all_added(count: usize) -> Self {
        Self {
            added: count,
            ..Self::default()
        }
    }
}

/// Compare `source` against `target`. Output lists are in sorted key order.
pub fn diff(source: &FlatMap, target: &FlatMap) -> DiffResult {
    let mut result = DiffResult::default();

    for (key, value) in source {
        match target.get(key) {
            None => result.removed.push(key.clone()),
            Some(other) if other == value => result.unchanged.push(key.clone()),
            Some(_) => result.modified.push(key.clone()),
        }
    }
    for key in target.keys() {
        if !source.contains_key(key) {
            result.added.push(key.clone());
        }
    }

    result
}

/// Deep-merge `source` over `target`, returning a new tree.
///
/// Where both sides hold a node the merge recurses; anywhere else the
/// `source` value replaces the `target` value. Keys only in `target` survive.
pub fn merge_deep(target: &NestedTree, source: &NestedTree) -> NestedTree {
    let mut result = target.clone();
    for (key, incoming) in source {
        let merged = match (result.get(key), incoming) {
            (Some(TreeValue::Node(existing)), TreeValue::Node(update)) => {
                TreeValue::Node(merge_deep(existing, update))
            }
            _ => incoming.clone(),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Diff `local` against `remote` and pair up conflicting values.
///
/// The report never blocks a merge; callers use it for display and for the
/// optional conflict file.
pub fn generate_merge_report(local: &FlatMap, remote: &FlatMap) -> MergeReport {
    let diff = diff(local, remote);

    let conflicts = diff
        .modified
        .iter()
        .map(|key| {
            (
                key.clone(),
                Conflict {
                    local: local[key].clone(),
                    remote: remote[key].clone(),
                },
            )
        })
        .collect();
    let incoming = diff
        .added
        .iter()
        .map(|key| (key.clone(), remote[key].clone()))
        .collect();
    let local_only = diff
        .removed
        .iter()
        .map(|key| (key.clone(), local[key].clone()))
        .collect();

    MergeReport {
        diff,
        conflicts,
        incoming,
        local_only,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use i18nflow_core::codec::{flatten, nest};

    fn flat(pairs: &[(&str, &str)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn diff_of_self_is_all_unchanged() {
        let a = flat(&[("x.a", "1"), ("x.b", "2"), ("y", "3")]);
        let result = diff(&a, &a);
        assert!(result.added.is_empty());
        assert!(result.removed.is_empty());
        assert!(result.modified.is_empty());
        assert_eq!(result.unchanged, vec!["x.a", "x.b", "y"]);
        assert!(result.is_clean());
    }

    #[test]
    fn diff_partitions_keys() {
        let source = flat(&[("keep", "same"), ("edit", "old"), ("gone", "bye")]);
        let target = flat(&[("keep", "same"), ("edit", "new"), ("fresh", "hi")]);
        let result = diff(&source, &target);
        assert_eq!(result.added, vec!["fresh"]);
        assert_eq!(result.removed, vec!["gone"]);
        assert_eq!(result.modified, vec!["edit"]);
        assert_eq!(result.unchanged, vec!["keep"]);
    }

    #[test]
    fn merge_deep_keeps_target_only_keys_and_takes_source_values() {
        let target = nest(&flat(&[("a.b", "old"), ("a.local", "mine"), ("z", "keep")])).unwrap();
        let source = nest(&flat(&[("a.b", "new"), ("a.c", "x")])).unwrap();
        let merged = flatten(&merge_deep(&target, &source));
        assert_eq!(
            merged,
            flat(&[("a.b", "new"), ("a.c", "x"), ("a.local", "mine"), ("z", "keep")])
        );
    }

    #[test]
    fn merge_deep_source_leaf_replaces_target_node() {
        let target = nest(&flat(&[("a.b.c", "deep")])).unwrap();
        let source = nest(&flat(&[("a.b", "flat")])).unwrap();
        let merged = merge_deep(&target, &source);
        assert_eq!(flatten(&merged), flat(&[("a.b", "flat")]));
    }

    #[test]
    fn merge_deep_source_node_replaces_target_leaf() {
        let target = nest(&flat(&[("a.b", "flat")])).unwrap();
        let source = nest(&flat(&[("a.b.c", "deep")])).unwrap();
        let merged = merge_deep(&target, &source);
        assert_eq!(flatten(&merged), flat(&[("a.b.c", "deep")]));
    }

    #[test]
    fn report_pairs_conflicting_values() {
        let local = flat(&[("a.b", "old"), ("only.local", "l")]);
        let remote = flat(&[("a.b", "new"), ("a.c", "x")]);
        let report = generate_merge_report(&local, &remote);
        assert_eq!(
            report.conflicts["a.b"],
            Conflict {
                local: "old".into(),
                remote: "new".into()
            }
        );
        assert_eq!(report.incoming, flat(&[("a.c", "x")]));
        assert_eq!(report.local_only, flat(&[("only.local", "l")]));

        let stats = MergeStats::from_report(&report);
        assert_eq!(
            stats,
            MergeStats {
                added: 1,
                conflicts: 1,
                unchanged: 0,
                local_only: 1
            }
        );
    }
}
