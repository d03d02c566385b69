//! Push pipeline: collect keys → validate → preview or submit.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use i18nflow_core::codec::{flatten, validate_key};
use i18nflow_core::{Config, FlatMap, LocaleSet};

use crate::error::SyncError;
use crate::transport::{PushRequest, PushResponse, RemoteTransport};
use crate::writer::{json_files, read_tree, LocalFile};

/// Keys listed by a dry run before the "... and N more" line.
pub const PREVIEW_LIMIT: usize = 10;

/// Where push takes its keys from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Scan source files with these glob patterns.
    Scan { patterns: Vec<String> },
    /// `<locales_dir>/<default_locale>/<namespace>.json`.
    Namespaced,
    /// Every `<locales_dir>/<locale>.json`.
    LocaleFiles { with_translations: bool },
}

/// Keys gathered from one [`KeySource`], not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedKeys {
    pub keys: Vec<String>,
    pub defaults: BTreeMap<String, String>,
    /// Per remote locale code, when the source carries full translations.
    pub translations: Option<LocaleSet>,
    pub warnings: Vec<String>,
}

impl CollectedKeys {
    fn warn(&mut self, message: String) {
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

// ---------------------------------------------------------------------------
// Collect
// ---------------------------------------------------------------------------

pub fn collect_keys(
    config: &Config,
    root: &Path,
    source: &KeySource,
) -> Result<CollectedKeys, SyncError> {
    match source {
        KeySource::Scan { patterns } => collect_from_scan(config, root, patterns),
        KeySource::Namespaced => collect_from_namespaces(config, root),
        KeySource::LocaleFiles { with_translations } => {
            collect_from_locale_files(config, root, *with_translations)
        }
    }
}

fn collect_from_scan(
    config: &Config,
    root: &Path,
    patterns: &[String],
) -> Result<CollectedKeys, SyncError> {
    let result = i18nflow_scanner::scan(root, patterns, &config.extractor_pattern)?;
    tracing::info!(
        "found {} keys in {} files",
        result.keys.len(),
        result.files.len()
    );
    Ok(CollectedKeys {
        keys: result.keys,
        defaults: result.defaults,
        translations: None,
        warnings: result.skipped.iter().map(ToString::to_string).collect(),
    })
}

fn collect_from_namespaces(config: &Config, root: &Path) -> Result<CollectedKeys, SyncError> {
    let dir = config.locales_dir_at(root).join(&config.default_locale);
    let mut collected = CollectedKeys::default();
    if !dir.is_dir() {
        collected.warn(format!(
            "default locale directory not found: {}",
            dir.display()
        ));
        return Ok(collected);
    }

    let files = json_files(&dir)?;
    if files.is_empty() {
        collected.warn(format!("no JSON files found in {}", dir.display()));
    }
    for (namespace, path) in files {
        let Some(flat) = read_flat(&path, &mut collected)? else {
            continue;
        };
        for (key, value) in flat {
            let full = format!("{namespace}.{key}");
            collected.keys.push(full.clone());
            collected.defaults.insert(full, value);
        }
    }
    Ok(collected)
}

fn collect_from_locale_files(
    config: &Config,
    root: &Path,
    with_translations: bool,
) -> Result<CollectedKeys, SyncError> {
    let dir = config.locales_dir_at(root);
    let mut collected = CollectedKeys::default();
    if !dir.is_dir() {
        collected.warn(format!("locales directory not found: {}", dir.display()));
        return Ok(collected);
    }

    let mut keys = BTreeSet::new();
    let mut translations = LocaleSet::new();
    let mut saw_default = false;
    for (locale, path) in json_files(&dir)? {
        let Some(flat) = read_flat(&path, &mut collected)? else {
            continue;
        };
        keys.extend(flat.keys().cloned());
        if locale == config.default_locale {
            saw_default = true;
            collected.defaults = flat.clone();
        }
        if with_translations {
            translations.insert(config.remote_locale(&locale).to_string(), flat);
        }
    }
    if !saw_default {
        collected.warn(format!(
            "default locale file not found: {}",
            dir.join(format!("{}.json", config.default_locale)).display()
        ));
    }

    collected.keys = keys.into_iter().collect();
    if with_translations {
        collected.translations = Some(translations);
    }
    Ok(collected)
}

fn read_flat(path: &Path, collected: &mut CollectedKeys) -> Result<Option<FlatMap>, SyncError> {
    match read_tree(path)? {
        LocalFile::Parsed(tree) => Ok(Some(flatten(&tree))),
        LocalFile::Missing => Ok(None),
        LocalFile::Malformed(reason) => {
            collected.warn(format!("skipping {}: {reason}", path.display()));
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// The head of a key list plus how many keys were left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPreview {
    pub shown: Vec<String>,
    pub remaining: usize,
}

impl KeyPreview {
    /// `... and N more`, when keys were left out.
    pub fn more_line(&self) -> Option<String> {
        (self.remaining > 0).then(|| format!("... and {} more", self.remaining))
    }
}

pub fn preview_keys(keys: &[String], limit: usize) -> KeyPreview {
    KeyPreview {
        shown: keys.iter().take(limit).cloned().collect(),
        remaining: keys.len().saturating_sub(limit),
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// Nothing to push; no request was made.
    Empty,
    /// Dry run; no request was made.
    DryRun(KeyPreview),
    Submitted(PushResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    /// Valid keys, in collection order.
    pub keys: Vec<String>,
    pub defaults: BTreeMap<String, String>,
    pub outcome: PushOutcome,
    pub warnings: Vec<String>,
}

/// Validate `collected` and, unless this is a dry run, submit it in one request.
pub fn push(
    transport: &dyn RemoteTransport,
    config: &Config,
    collected: CollectedKeys,
    dry_run: bool,
) -> Result<PushReport, SyncError> {
    let CollectedKeys {
        keys: raw_keys,
        mut defaults,
        mut translations,
        mut warnings,
    } = collected;

    let mut keys = Vec::with_capacity(raw_keys.len());
    for key in raw_keys {
        match validate_key(&key) {
            Ok(()) => keys.push(key),
            Err(err) => {
                tracing::warn!("{err}");
                warnings.push(format!("skipping malformed key '{key}'"));
            }
        }
    }
    let valid: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
    defaults.retain(|key, _| valid.contains(key.as_str()));
    if let Some(set) = translations.as_mut() {
        for flat in set.values_mut() {
            flat.retain(|key, _| valid.contains(key.as_str()));
        }
    }

    let outcome = if keys.is_empty() {
        warnings.push("no translation keys found".to_string());
        PushOutcome::Empty
    } else if dry_run {
        PushOutcome::DryRun(preview_keys(&keys, PREVIEW_LIMIT))
    } else {
        let request = PushRequest {
            project_id: config.project_id.clone(),
            keys: keys.clone(),
            defaults: defaults.clone(),
            translations,
        };
        let response = transport.push_keys(&request)?;
        tracing::info!(
            "push: {} added, {} existed, {} failed",
            response.added.len(),
            response.existed.len(),
            response.failed.len()
        );
        PushOutcome::Submitted(response)
    };

    Ok(PushReport {
        keys,
        defaults,
        outcome,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("k.{i:02}")).collect()
    }

    #[test]
    fn preview_of_short_list_shows_everything() {
        let preview = preview_keys(&keys(3), PREVIEW_LIMIT);
        assert_eq!(preview.shown.len(), 3);
        assert_eq!(preview.more_line(), None);
    }

    #[test]
    fn preview_of_long_list_is_cut_at_limit() {
        let preview = preview_keys(&keys(15), PREVIEW_LIMIT);
        assert_eq!(preview.shown, keys(10));
        assert_eq!(preview.more_line().as_deref(), Some("... and 5 more"));
    }

    #[test]
    fn exactly_limit_has_no_more_line() {
        let preview = preview_keys(&keys(10), PREVIEW_LIMIT);
        assert_eq!(preview.remaining, 0);
        assert!(preview.more_line().is_none());
    }
}
