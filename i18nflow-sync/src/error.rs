//! Error types for i18nflow-sync.

use std::path::PathBuf;

use thiserror::Error;

use i18nflow_core::{CodecError, ConfigError};
use i18nflow_scanner::ScanError;

/// All errors that can abort a sync, push or status run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote store could not be reached or rejected the request.
    #[error("remote error: {0}")]
    Transport(#[from] TransportError),

    /// An error from configuration handling.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Source scanning could not start (bad pattern or extractor).
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// A translation tree could not be built.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a [`crate::RemoteTransport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("server returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
