//! Error types for i18nflow-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No `.i18nflow.yaml` or `package.json` found walking up from `start`.
    #[error("could not find project root above {start}")]
    ProjectRootNotFound { start: PathBuf },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}; run `i18nflow init` first")]
    NotFound { path: PathBuf },

    /// Required settings are empty.
    #[error("missing configuration: {}; run `i18nflow init` first", fields.join(", "))]
    Missing { fields: Vec<&'static str> },
}

/// Errors from the key path codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A translation key with an empty segment (`""`, `a..b`, `.a`, `a.`).
    #[error("invalid translation key '{key}': empty segment")]
    InvalidKey { key: String },

    /// A JSON value that has no translation-tree representation.
    #[error("unsupported {kind} value at '{path}'")]
    UnsupportedValue { path: String, kind: &'static str },

    /// The document root is not a JSON object.
    #[error("translation file root must be an object, found {kind}")]
    NotAnObject { kind: &'static str },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
