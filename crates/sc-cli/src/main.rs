//! SuperClaude plugin sync CLI
//!
//! Pulls commands and agents from the Framework repository into the plugin,
//! namespaced under `sc`.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    match cli.command {
        Commands::Sync {
            source_repo,
            plugin_root,
            dry_run,
            output_report,
            config,
        } => commands::run_sync(commands::SyncArgs {
            source_repo,
            plugin_root,
            dry_run,
            output_report,
            config,
        }),
        Commands::Layout { config } => commands::run_layout(config.as_deref()),
    }
}
