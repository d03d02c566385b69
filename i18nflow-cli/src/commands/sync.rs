//! `i18nflow sync` — pull remote translations into the locale files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use i18nflow_sync::pull::FileOutcome;
use i18nflow_sync::{pull, Layout, PullOptions, PullReport, WriteResult};

use crate::transport::HttpTransport;

use super::{load_project, print_warnings};

/// Arguments for `i18nflow sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Comma-separated locales to sync (remote codes or file names).
    #[arg(long, short = 'l', value_delimiter = ',')]
    pub locale: Vec<String>,

    /// Overwrite local files with the remote content instead of merging.
    #[arg(long, short = 'f')]
    pub force: bool,

    /// One folder per locale, one file per namespace.
    #[arg(long, short = 'n')]
    pub nested: bool,

    /// Copy each changed file to `<file>.backup-<millis>` first.
    #[arg(long)]
    pub backup: bool,

    /// Write conflicting values to this JSON file (relative to the working
    /// directory).
    #[arg(long, value_name = "PATH")]
    pub conflict_file: Option<PathBuf>,

    /// Show what would be written without writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (root, config) = load_project()?;

        let mut options = PullOptions::from_config(&config, &root);
        options.locales = self.locale;
        options.force = self.force;
        options.layout = Layout::from_nested(self.nested);
        options.backup |= self.backup;
        options.dry_run = self.dry_run;
        if let Some(path) = self.conflict_file {
            let cwd = std::env::current_dir().context("could not determine working directory")?;
            options.conflict_report = Some(cwd.join(path));
        }

        let transport = HttpTransport::new(&config);
        let report = pull(&transport, &config, &root, &options, Utc::now())
            .context("sync failed")?;

        print_warnings(&report.warnings);
        print_report(&report, &root, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &PullReport, root: &Path, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    if report.files.is_empty() {
        println!("{prefix}Nothing to sync.");
        return;
    }

    let written = report
        .files
        .iter()
        .filter(|f| !matches!(f.write, WriteResult::Unchanged { .. }))
        .count();
    println!(
        "{prefix}{} Synced {} locale(s) ({} written, {} unchanged)",
        "✓".green(),
        report.locales.len(),
        written,
        report.files.len() - written
    );

    for file in &report.files {
        print_file(file, root);
    }

    let totals = report.totals();
    println!(
        "Added: {}  Conflicts: {}  Unchanged: {}  Local only: {}",
        totals.added.to_string().cyan(),
        totals.conflicts.to_string().yellow(),
        totals.unchanged,
        totals.local_only
    );
    println!("Locales: {}", report.locales.join(", ").cyan());
    if let Some(path) = &report.conflict_report {
        println!(
            "{} {} conflict(s) saved to {}",
            "⚠".yellow(),
            report.conflicts.len(),
            path.display()
        );
    }
}

fn print_file(file: &FileOutcome, root: &Path) {
    let path = file.write.path();
    let shown = path.strip_prefix(root).unwrap_or(path).display();
    let marker = match file.write {
        WriteResult::Written { .. } => "✎",
        WriteResult::WouldWrite { .. } => "~",
        WriteResult::Unchanged { .. } => "·",
    };
    println!(
        "  {marker}  {shown}  (+{} added, {} conflicts)",
        file.stats.added, file.stats.conflicts
    );
    if let Some(backup) = &file.backup {
        println!("     backup: {}", backup.display());
    }
}
