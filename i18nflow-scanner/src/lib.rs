//! Translation key discovery for `i18nflow-scanner`.
//!
//! `scan(root, patterns, extractor)` walks `root`, keeps the files selected by
//! the glob patterns, and runs the extractor regex over each file. Group 1 of
//! every match is a translation key. When the call continues with a string
//! literal (`t("key", "Default")`) that literal is kept as the key's default;
//! this is a lexical heuristic and a missing default is never an error.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

/// Pattern for the literal that may follow the key inside the call.
const DEFAULT_VALUE_PATTERN: &str = r#"^\s*,\s*['"](.*?)['"][),]"#;

/// Directories never worth scanning.
const ALWAYS_EXCLUDED: &str = "**/node_modules/**";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Everything a scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Unique keys, in order of first occurrence.
    pub keys: Vec<String>,
    /// Recovered default values, keyed by translation key.
    pub defaults: BTreeMap<String, String>,
    /// Files that were read.
    pub files: Vec<PathBuf>,
    /// Files that matched but could not be read.
    pub skipped: Vec<SkippedFile>,
}

/// A matched file the scan could not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for SkippedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.path.display(), self.reason)
    }
}

/// Errors from scanning. Per-file problems are not errors; see [`SkippedFile`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid extractor pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("extractor pattern must have exactly one capture group, found {found}")]
    CaptureGroups { found: usize },

    #[error("no include patterns given (only negations)")]
    NoIncludePatterns,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan the files under `root` selected by `patterns` for translation keys.
///
/// Patterns are relative to `root`, use `/` separators, and may use `{a,b}`
/// alternatives. A leading `!` turns a pattern into an exclusion.
pub fn scan(root: &Path, patterns: &[String], extractor: &str) -> Result<ScanResult, ScanError> {
    let key_regex = Regex::new(extractor)?;
    let groups = key_regex.captures_len() - 1;
    if groups != 1 {
        return Err(ScanError::CaptureGroups { found: groups });
    }
    let default_regex = Regex::new(DEFAULT_VALUE_PATTERN)?;
    let selection = PatternSet::parse(patterns)?;

    let mut result = ScanResult::default();
    let mut seen = HashSet::new();

    for path in selection.select(root, &mut result.skipped) {
        let content = match read_text(&path) {
            Ok(content) => content,
            Err(reason) => {
                tracing::warn!("skipping {}: {reason}", path.display());
                result.skipped.push(SkippedFile { path, reason });
                continue;
            }
        };

        for captures in key_regex.captures_iter(&content) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let key = key.as_str();
            if key.is_empty() {
                continue;
            }
            if seen.insert(key.to_string()) {
                result.keys.push(key.to_string());
            }
            if !result.defaults.contains_key(key) {
                if let Some(default) = default_regex
                    .captures(&content[whole.end()..])
                    .and_then(|c| c.get(1))
                {
                    result
                        .defaults
                        .insert(key.to_string(), default.as_str().to_string());
                }
            }
        }

        tracing::debug!("scanned {}", path.display());
        result.files.push(path);
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// File selection
// ---------------------------------------------------------------------------

struct PatternSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PatternSet {
    fn parse(patterns: &[String]) -> Result<Self, ScanError> {
        let mut include = Vec::new();
        let mut exclude = vec![compile(ALWAYS_EXCLUDED)?];

        for raw in patterns {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let (negated, body) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let body = body.strip_prefix("./").unwrap_or(body);
            for expanded in expand_braces(body) {
                let pattern = compile(&expanded)?;
                if negated {
                    exclude.push(pattern);
                } else {
                    include.push(pattern);
                }
            }
        }

        if include.is_empty() {
            return Err(ScanError::NoIncludePatterns);
        }
        Ok(Self { include, exclude })
    }

    fn matches(&self, relative: &str) -> bool {
        let options = match_options();
        self.include
            .iter()
            .any(|p| p.matches_with(relative, options))
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_with(relative, options))
    }

    /// Matching files under `root`, in sorted walk order.
    fn select(&self, root: &Path, skipped: &mut Vec<SkippedFile>) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules");

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    tracing::warn!("cannot walk {}: {err}", path.display());
                    skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            if self.matches(&slash_path(relative)) {
                files.push(entry.into_path());
            }
        }
        files
    }
}

fn compile(pattern: &str) -> Result<Pattern, ScanError> {
    Pattern::new(pattern).map_err(|source| ScanError::Glob {
        pattern: pattern.to_string(),
        source,
    })
}

fn match_options() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_text(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|_| "not valid UTF-8 text".to_string())
}

/// Expand shell-style `{a,b}` alternatives; nested groups are supported.
/// An unbalanced `{` is kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (offset, ch) in pattern[open..].char_indices() {
        let idx = open + offset;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    let mut out = Vec::new();
    for window in bounds.windows(2) {
        let alternative = &pattern[window[0] + 1..window[1]];
        for expanded in expand_braces(&format!("{prefix}{alternative}{suffix}")) {
            out.push(expanded);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
