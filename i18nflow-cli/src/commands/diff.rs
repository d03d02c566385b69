//! `i18nflow diff` — show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use i18nflow_sync::preview::preview_plan;
use i18nflow_sync::{plan_pull, Layout, PullOptions, RemoteTransport};

use crate::transport::HttpTransport;

use super::{load_project, print_warnings};

/// Arguments for `i18nflow diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Comma-separated locales to diff.
    #[arg(long, short = 'l', value_delimiter = ',')]
    pub locale: Vec<String>,

    /// Diff against a forced overwrite instead of a merge.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// One folder per locale, one file per namespace.
    #[arg(long, short = 'n')]
    pub nested: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let (root, config) = load_project()?;

        let mut options = PullOptions::from_config(&config, &root);
        options.locales = self.locale;
        options.force = self.force;
        options.layout = Layout::from_nested(self.nested);
        options.dry_run = true;

        let transport = HttpTransport::new(&config);
        let remote = transport
            .fetch_translations(&config.project_id, None)
            .context("failed to fetch remote translations")?;
        let plan = plan_pull(&config, &root, &remote, &options).context("diff failed")?;
        print_warnings(&plan.warnings);

        let diffs = preview_plan(&plan, &root);
        if diffs.is_empty() {
            println!("No differences.");
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        Ok(())
    }
}
