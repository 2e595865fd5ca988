//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SuperClaude plugin sync - pull Framework content into the namespaced plugin
#[derive(Parser, Debug)]
#[command(name = "sc-plugin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sync Framework commands and agents into the plugin
    ///
    /// Examples:
    ///   sc-plugin sync                              # Sync into the current directory
    ///   sc-plugin sync --dry-run                    # Preview without writing
    ///   sc-plugin sync --output-report report.json  # Save the JSON report
    Sync {
        /// Framework repository URL or local path
        #[arg(long, env = "SC_SOURCE_REPO")]
        source_repo: Option<String>,

        /// Plugin repository root
        #[arg(long, env = "SC_PLUGIN_ROOT")]
        plugin_root: Option<PathBuf>,

        /// Preview changes without applying them (true/false/1/0/yes/no)
        #[arg(
            long,
            num_args = 0..=1,
            default_value = "false",
            default_missing_value = "true",
            value_parser = parse_flag
        )]
        dry_run: bool,

        /// Save the sync report as JSON
        #[arg(long)]
        output_report: Option<PathBuf>,

        /// Sync layout file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the sync mappings and protected paths
    Layout {
        /// Sync layout file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Parse a boolean flag value.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected true/false/1/0/yes/no, got '{other}'")),
    }
}
