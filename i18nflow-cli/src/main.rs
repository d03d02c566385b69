//! i18nflow — keep locale files in sync with a translation server.
//!
//! # Usage
//!
//! ```text
//! i18nflow init --api-key <key> --project-id <id> [--server-url <url>] [--skip-check]
//! i18nflow sync [--locale en,fr] [--force] [--nested] [--backup] [--dry-run]
//! i18nflow push [--scan [--path <glob,...>]] [--nested] [--with-translations] [--dry-run]
//! i18nflow status [--nested] [--json]
//! i18nflow diff [--locale en] [--force] [--nested]
//! ```
//!
//! Set `RUST_LOG=debug` for request and file level logging.

mod commands;
mod transport;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, init::InitArgs, push::PushArgs, status::StatusArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "i18nflow",
    version,
    about = "Sync translation keys between source code, locale files and a translation server",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the project config and check the API key.
    Init(InitArgs),

    /// Pull remote translations and merge them into the locale files.
    Sync(SyncArgs),

    /// Push new translation keys to the server.
    Push(PushArgs),

    /// Compare local locale files with the server.
    Status(StatusArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Push(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
