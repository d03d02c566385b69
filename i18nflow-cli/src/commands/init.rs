//! `i18nflow init --api-key <key> --project-id <id> [--server-url ...]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use i18nflow_core::config::{self, config_path_at};

use crate::transport::HttpTransport;

use super::project_root;

/// Write `.i18nflow.yaml` at the project root.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Translation server base URL.
    #[arg(long, short = 's')]
    pub server_url: Option<String>,

    /// API key sent as `X-API-Key`.
    #[arg(long, short = 'k')]
    pub api_key: String,

    /// Remote project identifier.
    #[arg(long, short = 'p')]
    pub project_id: String,

    /// Locale files directory, relative to the project root.
    #[arg(long, short = 'd')]
    pub locales_dir: Option<PathBuf>,

    /// Locale used as the key source for `push`.
    #[arg(long)]
    pub default_locale: Option<String>,

    /// Overwrite an existing config file.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Do not verify the API key against the server.
    #[arg(long)]
    pub skip_check: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = project_root()?;
        let path = config_path_at(&root);
        if path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }

        let mut config = config::load_or_default_at(&root)
            .with_context(|| format!("failed to read {}", path.display()))?;
        config.api_key = self.api_key;
        config.project_id = self.project_id;
        if let Some(url) = self.server_url {
            config.server_url = url;
        }
        if let Some(dir) = self.locales_dir {
            config.locales_dir = dir;
        }
        if let Some(locale) = self.default_locale {
            config.default_locale = locale;
        }
        config.validate()?;

        if !self.skip_check {
            let authorized = HttpTransport::new(&config)
                .check_auth()
                .with_context(|| format!("could not reach {}", config.server_url))?;
            if !authorized {
                bail!("the server rejected the API key");
            }
            println!("{} API key accepted", "✓".green());
        }

        config::save_at(&root, &config)
            .with_context(|| format!("failed to save {}", path.display()))?;
        let locales_dir = config.locales_dir_at(&root);
        std::fs::create_dir_all(&locales_dir)
            .with_context(|| format!("failed to create {}", locales_dir.display()))?;

        println!("{} Wrote {}", "✓".green(), path.display());
        println!("  Locales: {}", locales_dir.display());
        Ok(())
    }
}
