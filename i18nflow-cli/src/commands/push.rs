//! `i18nflow push` — submit new translation keys to the server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use i18nflow_sync::push::{preview_keys, KeyPreview, PREVIEW_LIMIT};
use i18nflow_sync::{collect_keys, push, KeySource, PushOutcome, PushReport};

use crate::transport::HttpTransport;

use super::{load_project, print_warnings};

/// Arguments for `i18nflow push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Scan source files for translation keys.
    #[arg(long, short = 's')]
    pub scan: bool,

    /// Comma-separated glob patterns for `--scan` (defaults to the config).
    #[arg(long, short = 'p', value_delimiter = ',', requires = "scan")]
    pub path: Vec<String>,

    /// List the keys without pushing them.
    #[arg(long, short = 'd')]
    pub dry_run: bool,

    /// Read keys from `<locales_dir>/<default_locale>/*.json`.
    #[arg(long, short = 'n', conflicts_with = "scan")]
    pub nested: bool,

    /// Also send every locale file's values.
    #[arg(long, conflicts_with_all = ["scan", "nested"])]
    pub with_translations: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let (root, config) = load_project()?;

        let source = if self.scan {
            let patterns = if self.path.is_empty() {
                config.source_patterns.clone()
            } else {
                self.path
            };
            KeySource::Scan { patterns }
        } else if self.nested {
            KeySource::Namespaced
        } else {
            KeySource::LocaleFiles {
                with_translations: self.with_translations,
            }
        };

        let collected =
            collect_keys(&config, &root, &source).context("failed to collect translation keys")?;
        println!("Found {} translation keys", collected.keys.len());

        let transport = HttpTransport::new(&config);
        let report = push(&transport, &config, collected, self.dry_run).context("push failed")?;

        print_warnings(&report.warnings);
        match &report.outcome {
            PushOutcome::Empty => {}
            PushOutcome::DryRun(preview) => {
                print_preview(&report, preview);
                println!(
                    "Found {} keys (dry run, not pushing to server)",
                    report.keys.len()
                );
            }
            PushOutcome::Submitted(response) => {
                if report.keys.len() <= PREVIEW_LIMIT {
                    print_preview(&report, &preview_keys(&report.keys, PREVIEW_LIMIT));
                }
                println!("{} Translation keys pushed to server", "✓".green());
                if !response.added.is_empty() {
                    println!("Added {} new keys", response.added.len());
                }
                for key in &response.existed {
                    println!("Existing key: {}", key.green());
                }
                if !response.failed.is_empty() {
                    println!(
                        "{} Failed to add {} keys:",
                        "⚠".yellow(),
                        response.failed.len()
                    );
                    for key in &response.failed {
                        println!("  {}", key.red());
                    }
                }
            }
        }
        Ok(())
    }
}

fn print_preview(report: &PushReport, preview: &KeyPreview) {
    println!("Translation keys:");
    for key in &preview.shown {
        let default = report
            .defaults
            .get(key)
            .filter(|value| !value.is_empty())
            .map(String::as_str)
            .unwrap_or("(no default)");
        println!("  {}: {}", key.cyan(), default.bright_black());
    }
    if let Some(more) = preview.more_line() {
        println!("  {more}");
    }
}
