//! Project configuration.
//!
//! # Storage layout
//!
//! ```text
//! <project_root>/
//!   .i18nflow.yaml      (mode 0600 — holds the API key)
//!   src/locales/        (default `locales_dir`)
//! ```
//!
//! The configuration is loaded once by the command layer and passed down as a
//! value; nothing in the workspace caches it globally.
//!
//! # API pattern
//!
//! Functions take the project root explicitly (`*_at(root, …)`); only
//! [`find_project_root`] looks at the process working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// File name of the per-project config.
pub const CONFIG_FILENAME: &str = ".i18nflow.yaml";

/// Default regex used to pull keys out of `t('...')` / `i18n.t("...")` calls.
pub const DEFAULT_EXTRACTOR_PATTERN: &str = r#"(?:t|i18n\.t)\(['"]([\w\.\-]+)['"]"#;

/// Settings for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub api_key: String,
    pub project_id: String,
    /// Relative paths resolve against the project root.
    pub locales_dir: PathBuf,
    pub default_locale: String,
    pub source_patterns: Vec<String>,
    pub extractor_pattern: String,
    /// On-disk locale file name → remote locale code.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub language_mapping: BTreeMap<String, String>,
    /// Where `sync` writes the conflict report, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_file: Option<PathBuf>,
    /// Copy each locale file to `<file>.backup-<millis>` before overwriting it.
    pub backup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            project_id: String::new(),
            locales_dir: PathBuf::from("src/locales"),
            default_locale: "en".to_string(),
            source_patterns: vec![
                "src/**/*.{js,jsx,ts,tsx}".to_string(),
                "!src/**/*.{spec,test}.{js,jsx,ts,tsx}".to_string(),
                "!**/node_modules/**".to_string(),
            ],
            extractor_pattern: DEFAULT_EXTRACTOR_PATTERN.to_string(),
            language_mapping: BTreeMap::new(),
            conflict_file: None,
            backup: false,
        }
    }
}

impl Config {
    /// Check that every setting the remote commands need is present.
    ///
    /// The error lists all missing fields, not just the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut fields = Vec::new();
        if self.api_key.trim().is_empty() {
            fields.push("api_key");
        }
        if self.project_id.trim().is_empty() {
            fields.push("project_id");
        }
        if self.server_url.trim().is_empty() {
            fields.push("server_url");
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing { fields })
        }
    }

    /// Absolute locales directory for a project rooted at `root`.
    pub fn locales_dir_at(&self, root: &Path) -> PathBuf {
        if self.locales_dir.is_absolute() {
            self.locales_dir.clone()
        } else {
            root.join(&self.locales_dir)
        }
    }

    /// Remote locale code for an on-disk locale name.
    pub fn remote_locale<'a>(&'a self, local: &'a str) -> &'a str {
        self.language_mapping
            .get(local)
            .map(String::as_str)
            .unwrap_or(local)
    }

    /// On-disk locale name for a remote locale code (inverse of the mapping).
    pub fn local_locale<'a>(&'a self, remote: &'a str) -> &'a str {
        self.language_mapping
            .iter()
            .find(|(_, code)| code.as_str() == remote)
            .map(|(file, _)| file.as_str())
            .unwrap_or(remote)
    }
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<root>/.i18nflow.yaml` — pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILENAME)
}

/// Walk up from `start` to the first directory holding `.i18nflow.yaml` or
/// `package.json`.
pub fn find_project_root_at(start: &Path) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        if dir.join(CONFIG_FILENAME).is_file() || dir.join("package.json").is_file() {
            return Ok(dir.to_path_buf());
        }
    }
    Err(ConfigError::ProjectRootNotFound {
        start: start.to_path_buf(),
    })
}

/// `find_project_root_at` starting from the current working directory.
pub fn find_project_root() -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    find_project_root_at(&cwd)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load `<root>/.i18nflow.yaml`; fields absent from the file take defaults.
///
/// Returns `ConfigError::NotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Like [`load_at`], but a missing file yields the defaults.
pub fn load_or_default_at(root: &Path) -> Result<Config, ConfigError> {
    match load_at(root) {
        Err(ConfigError::NotFound { .. }) => Ok(Config::default()),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<root>/.i18nflow.yaml`.
///
/// Write flow: serialize → `.i18nflow.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(root: &Path, config: &Config) -> Result<(), ConfigError> {
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;
    let path = config_path_at(root);
    let tmp_path = root.join(format!("{CONFIG_FILENAME}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
