//! Pull pipeline: remote translations → locale files on disk.
//!
//! `pull` = fetch + [`plan_pull`] + [`apply_pull`]. Planning reads the disk
//! and computes every file's final content; applying takes backups, writes
//! and records the conflict report. The `diff` command stops after planning.
//!
//! Locales, and the namespace files within a locale, are handled strictly in
//! sorted order, one at a time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use i18nflow_core::codec::{flatten, group_by_namespace, nest, partition_valid};
use i18nflow_core::{Config, LocaleSet, NestedTree};

use crate::conflicts::{entries_for, write_conflict_report, ConflictEntry};
use crate::error::SyncError;
use crate::merge::{generate_merge_report, merge_deep, MergeStats};
use crate::transport::RemoteTransport;
use crate::writer::{
    backup_file, parse_tree, read_existing, render_tree, write_if_changed, LocalFile,
    WriteResult,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How locale data is laid out under the locales directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// `<dir>/<locale>.json` holding the whole nested tree.
    #[default]
    SingleFile,
    /// `<dir>/<locale>/<namespace>.json`, one file per first key segment.
    Namespaced,
}

impl Layout {
    pub fn from_nested(nested: bool) -> Self {
        if nested {
            Layout::Namespaced
        } else {
            Layout::SingleFile
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullOptions {
    /// Locale subset; empty means every locale the remote has. Entries may
    /// be remote codes or on-disk names.
    pub locales: Vec<String>,
    /// Replace file content with the remote tree instead of merging.
    pub force: bool,
    pub layout: Layout,
    pub backup: bool,
    pub conflict_report: Option<PathBuf>,
    pub dry_run: bool,
}

impl PullOptions {
    /// Defaults taken from the project config; flags override them later.
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self {
            backup: config.backup,
            conflict_report: config.conflict_file.as_ref().map(|p| root.join(p)),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One file the pull would produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    /// On-disk locale name.
    pub locale: String,
    pub namespace: Option<String>,
    pub path: PathBuf,
    pub content: String,
    /// Current file bytes, if the file exists.
    pub existing: Option<Vec<u8>>,
    pub stats: MergeStats,
}

impl PlannedFile {
    pub fn is_unchanged(&self) -> bool {
        self.existing.as_deref() == Some(self.content.as_bytes())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullPlan {
    /// On-disk names of the locales that produce files.
    pub locales: Vec<String>,
    pub files: Vec<PlannedFile>,
    pub conflicts: Vec<ConflictEntry>,
    pub warnings: Vec<String>,
}

impl PullPlan {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

/// Compute the content of every locale file a pull of `remote` would write.
///
/// Reads the disk, writes nothing.
pub fn plan_pull(
    config: &Config,
    root: &Path,
    remote: &LocaleSet,
    options: &PullOptions,
) -> Result<PullPlan, SyncError> {
    let dir = config.locales_dir_at(root);
    let mut plan = PullPlan::default();

    for (remote_code, local) in select_locales(config, remote, &options.locales, &mut plan) {
        let Some(flat) = remote.get(&remote_code) else {
            continue;
        };
        if !is_file_stem(&local) {
            plan.warn(format!("skipping locale '{local}': not a valid file name"));
            continue;
        }
        let (valid, skipped) = partition_valid(flat);
        for skip in skipped {
            plan.warn(format!("{local}: {skip}"));
        }
        if valid.is_empty() {
            tracing::debug!("no translations for {local}; no file written");
            continue;
        }

        let planned_before = plan.files.len();
        match options.layout {
            Layout::SingleFile => {
                let path = dir.join(format!("{local}.json"));
                let incoming = nest(&valid)?;
                plan_file(&mut plan, &local, None, path, incoming, options.force)?;
            }
            Layout::Namespaced => {
                let groups = group_by_namespace(&valid);
                for skip in groups.skipped {
                    plan.warn(format!("{local}: {skip}"));
                }
                for (namespace, incoming) in groups.namespaces {
                    if !is_file_stem(&namespace) {
                        plan.warn(format!(
                            "{local}: skipping namespace '{namespace}': not a valid file name"
                        ));
                        continue;
                    }
                    let path = dir.join(&local).join(format!("{namespace}.json"));
                    plan_file(
                        &mut plan,
                        &local,
                        Some(namespace),
                        path,
                        incoming,
                        options.force,
                    )?;
                }
            }
        }
        if plan.files.len() > planned_before {
            plan.locales.push(local);
        }
    }

    Ok(plan)
}

/// A name usable as one path component directly under the locales directory.
fn is_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\\')
        && !Path::new(name).is_absolute()
}

/// Remote locales to process, paired with their on-disk names.
fn select_locales(
    config: &Config,
    remote: &LocaleSet,
    requested: &[String],
    plan: &mut PullPlan,
) -> Vec<(String, String)> {
    let available: Vec<(String, String)> = remote
        .keys()
        .map(|code| (code.clone(), config.local_locale(code).to_string()))
        .collect();
    if requested.is_empty() {
        return available;
    }

    for name in requested {
        if !available.iter().any(|(code, local)| code == name || local == name) {
            plan.warn(format!("locale '{name}' not found on the remote"));
        }
    }
    available
        .into_iter()
        .filter(|(code, local)| requested.iter().any(|r| r == code || r == local))
        .collect()
}

fn plan_file(
    plan: &mut PullPlan,
    locale: &str,
    namespace: Option<String>,
    path: PathBuf,
    incoming: NestedTree,
    force: bool,
) -> Result<(), SyncError> {
    let existing = read_existing(&path)?;

    let (tree, stats) = if force {
        let count = flatten(&incoming).len();
        (incoming, MergeStats::all_added(count))
    } else {
        let local = match &existing {
            None => NestedTree::new(),
            Some(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => match parse_tree(text) {
                    LocalFile::Malformed(reason) => {
                        plan.warn(format!(
                            "could not parse {}, treating as empty: {reason}",
                            path.display()
                        ));
                        NestedTree::new()
                    }
                    parsed => parsed.into_tree(),
                },
                Err(_) => {
                    plan.warn(format!(
                        "could not parse {}, treating as empty: not valid UTF-8",
                        path.display()
                    ));
                    NestedTree::new()
                }
            },
        };

        let report = generate_merge_report(&flatten(&local), &flatten(&incoming));
        let mut entries = entries_for(&report, locale);
        if let Some(ns) = &namespace {
            for entry in &mut entries {
                entry.key = format!("{ns}.{}", entry.key);
            }
        }
        plan.conflicts.extend(entries);
        (merge_deep(&local, &incoming), MergeStats::from_report(&report))
    };

    let content = render_tree(&tree)?;
    plan.files.push(PlannedFile {
        locale: locale.to_string(),
        namespace,
        path,
        content,
        existing,
        stats,
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// What happened to one planned file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub locale: String,
    pub namespace: Option<String>,
    pub write: WriteResult,
    pub stats: MergeStats,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    pub locales: Vec<String>,
    pub files: Vec<FileOutcome>,
    pub conflicts: Vec<ConflictEntry>,
    /// Set when a conflict report was written.
    pub conflict_report: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl PullReport {
    /// Stats summed over every file.
    pub fn totals(&self) -> MergeStats {
        self.files
            .iter()
            .fold(MergeStats::default(), |acc, file| MergeStats {
                added: acc.added + file.stats.added,
                conflicts: acc.conflicts + file.stats.conflicts,
                unchanged: acc.unchanged + file.stats.unchanged,
                local_only: acc.local_only + file.stats.local_only,
            })
    }

    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

/// Write a plan to disk.
///
/// Backups are taken only for existing files whose content changes. Backup
/// and conflict report failures become warnings; a failed locale file write
/// aborts the pass.
pub fn apply_pull(
    plan: PullPlan,
    options: &PullOptions,
    now: DateTime<Utc>,
) -> Result<PullReport, SyncError> {
    let mut report = PullReport {
        locales: plan.locales,
        conflicts: plan.conflicts,
        warnings: plan.warnings,
        ..PullReport::default()
    };

    for file in plan.files {
        let mut backup = None;
        if options.backup && !options.dry_run && file.existing.is_some() && !file.is_unchanged()
        {
            match backup_file(&file.path, now.timestamp_millis()) {
                Ok(path) => backup = Some(path),
                Err(err) => report.warn(format!("backup failed: {err}")),
            }
        }

        let write = write_if_changed(&file.path, &file.content, options.dry_run)?;
        report.files.push(FileOutcome {
            locale: file.locale,
            namespace: file.namespace,
            write,
            stats: file.stats,
            backup,
        });
    }

    if let Some(path) = &options.conflict_report {
        if !report.conflicts.is_empty() && !options.dry_run {
            match write_conflict_report(path, report.conflicts.clone(), now) {
                Ok(()) => report.conflict_report = Some(path.clone()),
                Err(err) => report.warn(format!("could not write conflict report: {err}")),
            }
        }
    }

    Ok(report)
}

/// Fetch the remote translations and bring the locale files up to date.
pub fn pull(
    transport: &dyn RemoteTransport,
    config: &Config,
    root: &Path,
    options: &PullOptions,
    now: DateTime<Utc>,
) -> Result<PullReport, SyncError> {
    let remote = transport.fetch_translations(&config.project_id, None)?;
    tracing::debug!("fetched {} remote locales", remote.len());

    let mut plan = plan_pull(config, root, &remote, options)?;
    if plan.locales.is_empty() {
        plan.warn("no translations found for the selected locales".to_string());
    }
    apply_pull(plan, options, now)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use i18nflow_core::FlatMap;
    use tempfile::TempDir;

    fn flat(pairs: &[(&str, &str)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn remote() -> LocaleSet {
        let mut set = LocaleSet::new();
        set.insert("en".into(), flat(&[("a.b", "new")]));
        set.insert("zh-CN".into(), flat(&[("a.b", "新")]));
        set
    }

    #[test]
    fn requested_locales_match_remote_codes_or_local_names() {
        let mut config = Config::default();
        config.language_mapping.insert("zh".into(), "zh-CN".into());
        let mut plan = PullPlan::default();

        let selected = select_locales(&config, &remote(), &["zh".to_string()], &mut plan);
        assert_eq!(selected, vec![("zh-CN".to_string(), "zh".to_string())]);

        let selected = select_locales(&config, &remote(), &["zh-CN".to_string()], &mut plan);
        assert_eq!(selected.len(), 1);
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn unknown_requested_locale_is_a_warning() {
        let mut plan = PullPlan::default();
        let selected = select_locales(&Config::default(), &remote(), &["de".into()], &mut plan);
        assert!(selected.is_empty());
        assert_eq!(plan.warnings, vec!["locale 'de' not found on the remote"]);
    }

    #[test]
    fn mapped_locale_is_written_under_its_local_name() {
        let root = TempDir::new().unwrap();
        let mut config = Config::default();
        config.language_mapping.insert("zh".into(), "zh-CN".into());

        let plan = plan_pull(&config, root.path(), &remote(), &PullOptions::default()).unwrap();
        let names: Vec<_> = plan
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["en.json", "zh.json"]);
    }

    #[test]
    fn planning_writes_nothing() {
        let root = TempDir::new().unwrap();
        let plan = plan_pull(
            &Config::default(),
            root.path(),
            &remote(),
            &PullOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.files.len(), 2);
        assert!(!root.path().join("src").exists());
    }

    #[test]
    fn namespaced_conflicts_carry_full_keys() {
        let root = TempDir::new().unwrap();
        let config = Config::default();
        let ns_file = config.locales_dir_at(root.path()).join("en").join("a.json");
        std::fs::create_dir_all(ns_file.parent().unwrap()).unwrap();
        std::fs::write(&ns_file, r#"{"b": "old"}"#).unwrap();

        let options = PullOptions {
            layout: Layout::Namespaced,
            locales: vec!["en".into()],
            ..PullOptions::default()
        };
        let plan = plan_pull(&config, root.path(), &remote(), &options).unwrap();
        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].key, "a.b");
        assert_eq!(plan.conflicts[0].local_value, "old");
        assert_eq!(plan.conflicts[0].remote_value, "new");
    }
}
