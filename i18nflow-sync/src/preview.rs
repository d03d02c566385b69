//! Unified diffs of a planned pull, for `i18nflow diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::pull::PullPlan;

/// A single locale file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff every planned file against its current content. Unchanged files are
/// left out; a missing file diffs against the empty string.
pub fn preview_plan(plan: &PullPlan, root: &Path) -> Vec<FileDiff> {
    let mut diffs = Vec::new();
    for file in &plan.files {
        if file.is_unchanged() {
            continue;
        }
        let existing = file
            .existing
            .as_deref()
            .map(|bytes| normalize_line_endings(&String::from_utf8_lossy(bytes)))
            .unwrap_or_default();
        if existing == file.content {
            continue;
        }

        let relative = file.path.strip_prefix(root).unwrap_or(file.path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &file.content)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: file.path.clone(),
            unified_diff: unified,
        });
    }
    diffs
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
