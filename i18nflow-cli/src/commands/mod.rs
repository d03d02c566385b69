//! One module per subcommand; each exposes an `Args` struct with `run`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use i18nflow_core::{config, Config};

pub mod diff;
pub mod init;
pub mod push;
pub mod status;
pub mod sync;

/// The project root and its validated configuration.
///
/// The root is the nearest ancestor holding `.i18nflow.yaml` or
/// `package.json`, falling back to the working directory.
pub(crate) fn load_project() -> Result<(PathBuf, Config)> {
    let root = project_root()?;
    let config = config::load_or_default_at(&root)
        .with_context(|| format!("failed to load config in {}", root.display()))?;
    config.validate()?;
    Ok((root, config))
}

pub(crate) fn project_root() -> Result<PathBuf> {
    match config::find_project_root() {
        Ok(root) => Ok(root),
        Err(_) => std::env::current_dir().context("could not determine working directory"),
    }
}

pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", "⚠".yellow());
    }
}
