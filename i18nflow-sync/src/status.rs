//! Key-count drift between local locale files and the remote store.
//!
//! Per locale the signal is one of:
//! 1. `NotSynced` (remote has the locale, no local data)
//! 2. `LocalOnly` (local data, remote does not have the locale)
//! 3. `Drifted` (key sets differ)
//! 4. `InSync`
//!
//! Nothing is written.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use i18nflow_core::codec::{flatten, ungroup_namespaces};
use i18nflow_core::{Config, FlatMap, NestedTree};

use crate::error::{io_err, SyncError};
use crate::merge::diff;
use crate::pull::Layout;
use crate::transport::RemoteTransport;
use crate::writer::{json_files, read_tree, LocalFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftSignal {
    NotSynced,
    LocalOnly,
    Drifted,
    InSync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleStatus {
    /// On-disk locale name.
    pub locale: String,
    pub remote_locale: String,
    pub local_keys: usize,
    pub remote_keys: usize,
    /// On the remote, absent locally.
    pub missing: Vec<String>,
    /// Local, absent on the remote.
    pub extra: Vec<String>,
    pub signal: DriftSignal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Distinct keys across every remote locale.
    pub remote_total: usize,
    pub locales: Vec<LocaleStatus>,
    pub warnings: Vec<String>,
}

/// Compare every local locale with the remote store.
pub fn status(
    transport: &dyn RemoteTransport,
    config: &Config,
    root: &Path,
    layout: Layout,
) -> Result<StatusReport, SyncError> {
    let remote = transport.fetch_translations(&config.project_id, None)?;
    let mut warnings = Vec::new();
    let local = read_local_locales(config, root, layout, &mut warnings)?;

    let remote_total = remote
        .values()
        .flat_map(|flat| flat.keys())
        .collect::<BTreeSet<_>>()
        .len();

    let mut names: BTreeSet<String> = local.keys().cloned().collect();
    names.extend(remote.keys().map(|code| config.local_locale(code).to_string()));

    let empty = FlatMap::new();
    let locales = names
        .into_iter()
        .map(|name| {
            let remote_locale = config.remote_locale(&name).to_string();
            let local_flat = local.get(&name);
            let remote_flat = remote.get(&remote_locale);
            let result = diff(local_flat.unwrap_or(&empty), remote_flat.unwrap_or(&empty));
            let signal = match (local_flat, remote_flat) {
                (None, _) => DriftSignal::NotSynced,
                (Some(_), None) => DriftSignal::LocalOnly,
                _ if result.is_clean() => DriftSignal::InSync,
                _ => DriftSignal::Drifted,
            };
            LocaleStatus {
                local_keys: local_flat.map_or(0, FlatMap::len),
                remote_keys: remote_flat.map_or(0, FlatMap::len),
                locale: name,
                remote_locale,
                missing: result.added,
                extra: result.removed,
                signal,
            }
        })
        .collect();

    Ok(StatusReport {
        remote_total,
        locales,
        warnings,
    })
}

/// On-disk locale name → flattened keys, for whichever layout is in use.
fn read_local_locales(
    config: &Config,
    root: &Path,
    layout: Layout,
    warnings: &mut Vec<String>,
) -> Result<BTreeMap<String, FlatMap>, SyncError> {
    let dir = config.locales_dir_at(root);
    let mut out = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(out);
    }

    match layout {
        Layout::SingleFile => {
            for (locale, path) in json_files(&dir)? {
                if let Some(tree) = read_or_warn(&path, warnings)? {
                    out.insert(locale, flatten(&tree));
                }
            }
        }
        Layout::Namespaced => {
            let entries = std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))?;
            let mut locale_dirs = Vec::new();
            for entry in entries {
                let path = entry.map_err(|e| io_err(&dir, e))?.path();
                if let (true, Some(name)) = (path.is_dir(), path.file_name()) {
                    locale_dirs.push((name.to_string_lossy().to_string(), path.clone()));
                }
            }
            locale_dirs.sort();
            for (locale, locale_dir) in locale_dirs {
                let mut namespaces = BTreeMap::new();
                for (namespace, path) in json_files(&locale_dir)? {
                    if let Some(tree) = read_or_warn(&path, warnings)? {
                        namespaces.insert(namespace, tree);
                    }
                }
                out.insert(locale, ungroup_namespaces(&namespaces));
            }
        }
    }
    Ok(out)
}

fn read_or_warn(
    path: &Path,
    warnings: &mut Vec<String>,
) -> Result<Option<NestedTree>, SyncError> {
    match read_tree(path)? {
        LocalFile::Parsed(tree) => Ok(Some(tree)),
        LocalFile::Missing => Ok(None),
        LocalFile::Malformed(reason) => {
            let message = format!("could not parse {}: {reason}", path.display());
            tracing::warn!("{message}");
            warnings.push(message);
            Ok(None)
        }
    }
}
