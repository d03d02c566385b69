//! # i18nflow-sync
//!
//! Diff & merge engine, locale file writer and the sync orchestrator.
//!
//! Call [`pull`] to bring the locale files up to date with the remote store,
//! [`push`] (after [`collect_keys`]) to submit new keys, or [`status`] to
//! report drift. Every entry point takes the loaded [`i18nflow_core::Config`]
//! and a [`RemoteTransport`] explicitly.

pub mod conflicts;
pub mod error;
pub mod merge;
pub mod preview;
pub mod pull;
pub mod push;
pub mod status;
pub mod transport;
pub mod writer;

pub use error::{SyncError, TransportError};
pub use merge::{diff, generate_merge_report, merge_deep, DiffResult, MergeReport, MergeStats};
pub use pull::{apply_pull, plan_pull, pull, Layout, PullOptions, PullPlan, PullReport};
pub use push::{collect_keys, push, CollectedKeys, KeySource, PushOutcome, PushReport};
pub use status::{status, StatusReport};
pub use transport::{PushRequest, PushResponse, RemoteTransport};
pub use writer::WriteResult;
