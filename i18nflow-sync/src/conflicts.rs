//! Conflict report persistence.
//!
//! Written as `{timestamp, conflicts: [{key, localValue, remoteValue, locale}]}`
//! for human review. The report is advisory: callers turn a failed write into
//! a warning and carry on.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::merge::MergeReport;
use crate::writer::write_atomic;

/// One conflicting key as it appears in the report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    pub key: String,
    pub local_value: String,
    pub remote_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// The report file payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub timestamp: DateTime<Utc>,
    pub conflicts: Vec<ConflictEntry>,
}

/// Entries for every conflict in `report`, tagged with `locale`.
pub fn entries_for(report: &MergeReport, locale: &str) -> Vec<ConflictEntry> {
    report
        .conflicts
        .iter()
        .map(|(key, conflict)| ConflictEntry {
            key: key.clone(),
            local_value: conflict.local.clone(),
            remote_value: conflict.remote.clone(),
            locale: Some(locale.to_string()),
        })
        .collect()
}

/// Write the conflict report to `path` (whole-file, atomic).
pub fn write_conflict_report(
    path: &Path,
    conflicts: Vec<ConflictEntry>,
    timestamp: DateTime<Utc>,
) -> Result<(), SyncError> {
    let report = ConflictReport {
        timestamp,
        conflicts,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}
