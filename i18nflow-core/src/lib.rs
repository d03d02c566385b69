//! i18nflow core library — translation data types, key path codec, config.
//!
//! Public API surface:
//! - [`types`] — flat maps, nested trees, locale sets
//! - [`codec`] — flatten / nest / namespace grouping
//! - [`config`] — project configuration load / validate / save
//! - [`error`] — [`ConfigError`], [`CodecError`]

pub mod codec;
pub mod config;
pub mod error;
pub mod types;

pub use codec::{NamespaceGroups, SkipReason, SkippedKey};
pub use config::Config;
pub use error::{CodecError, ConfigError};
pub use types::{tree_from_json, FlatMap, LocaleSet, NestedTree, TreeValue};
