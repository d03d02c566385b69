//! `i18nflow status` — key drift between local files and the server.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use i18nflow_sync::status::{DriftSignal, LocaleStatus};
use i18nflow_sync::{status, Layout, StatusReport};

use crate::transport::HttpTransport;

use super::{load_project, print_warnings};

/// Key lists longer than this are only counted.
const LIST_LIMIT: usize = 5;

/// Arguments for `i18nflow status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Read the per-locale folder layout.
    #[arg(long, short = 'n')]
    pub nested: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let (root, config) = load_project()?;
        let transport = HttpTransport::new(&config);
        let report = status(&transport, &config, &root, Layout::from_nested(self.nested))
            .context("status check failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_warnings(&report.warnings);
        print_table(&report);
        Ok(())
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "locale")]
    locale: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "local keys")]
    local_keys: usize,
    #[tabled(rename = "remote keys")]
    remote_keys: usize,
    #[tabled(rename = "missing")]
    missing: usize,
    #[tabled(rename = "extra")]
    extra: usize,
}

fn print_table(report: &StatusReport) {
    let local_count = report
        .locales
        .iter()
        .filter(|l| l.signal != DriftSignal::NotSynced)
        .count();
    println!(
        "Found {} keys on server and {} locale(s) locally",
        report.remote_total, local_count
    );
    if report.locales.is_empty() {
        println!("No locales found.");
        return;
    }

    let rows: Vec<StatusTableRow> = report
        .locales
        .iter()
        .map(|l| StatusTableRow {
            locale: locale_label(l),
            status: signal_label(l.signal).to_string(),
            local_keys: l.local_keys,
            remote_keys: l.remote_keys,
            missing: l.missing.len(),
            extra: l.extra.len(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for locale in report
        .locales
        .iter()
        .filter(|l| l.signal == DriftSignal::Drifted)
    {
        print_key_list(&locale.locale, "missing from server copy", &locale.missing);
        print_key_list(&locale.locale, "not on server", &locale.extra);
    }

    if local_count == 0 {
        println!("Tip: run {} to download translations", "i18nflow sync".cyan());
    } else if report.remote_total == 0 {
        println!("Tip: run {} to push keys to server", "i18nflow push --scan".cyan());
    }
}

fn print_key_list(locale: &str, label: &str, keys: &[String]) {
    if keys.is_empty() || keys.len() > LIST_LIMIT {
        return;
    }
    println!("{} {label}:", locale.cyan());
    for key in keys {
        println!("    {}", key.yellow());
    }
}

fn locale_label(status: &LocaleStatus) -> String {
    if status.locale == status.remote_locale {
        status.locale.clone()
    } else {
        format!("{} ({})", status.locale, status.remote_locale)
    }
}

fn signal_label(signal: DriftSignal) -> String {
    match signal {
        DriftSignal::InSync => "IN SYNC".green().to_string(),
        DriftSignal::Drifted => "DRIFTED".yellow().to_string(),
        DriftSignal::NotSynced => "NOT SYNCED".bright_black().to_string(),
        DriftSignal::LocalOnly => "LOCAL ONLY".magenta().to_string(),
    }
}
