//! Sync command implementation

use std::path::PathBuf;

use colored::Colorize;

use sc_sync::{SyncOptions, SyncOrchestrator, SyncPlan, SyncReport};

use super::load_config;
use crate::error::{CliError, Result};

/// Arguments of `sc-plugin sync`
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub source_repo: Option<String>,
    pub plugin_root: Option<PathBuf>,
    pub dry_run: bool,
    pub output_report: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Run the sync command
///
/// Returns whether the sync succeeded. The report file is written either way.
pub fn run_sync(args: SyncArgs) -> Result<bool> {
    let mut plan = SyncPlan::new(load_config(args.config.as_deref())?)?;
    if let Some(source_repo) = args.source_repo {
        plan = plan.with_source_repo(source_repo);
    }

    let root = match args.plugin_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = dunce::canonicalize(&root)
        .map_err(|_| CliError::user(format!("Plugin root not found: {}", root.display())))?;

    println!(
        "{} Syncing {} into {}",
        "=>".blue().bold(),
        plan.source_repo().cyan(),
        root.display()
    );
    if args.dry_run {
        println!(
            "{} No changes will be applied",
            "DRY RUN".yellow().bold()
        );
    }

    let options = SyncOptions {
        dry_run: args.dry_run,
    };
    let report = SyncOrchestrator::for_plugin_root(plan, &root, options).run();

    if let Some(path) = &args.output_report {
        report.write_to(path)?;
    }

    print_summary(&report);
    Ok(report.success)
}

fn print_summary(report: &SyncReport) {
    let rule = "=".repeat(60);
    println!();
    println!("{rule}");
    println!("{}", "SYNC SUMMARY".bold());
    println!("{rule}");

    let status = if report.success {
        "OK".green().bold()
    } else {
        "FAILED".red().bold()
    };
    let short_commit: String = report.source_commit.chars().take(8).collect();

    println!("Status:                  {status}");
    println!("Framework version:       {}", report.source_version);
    println!("Framework commit:        {short_commit}");
    println!("Files synced:            {}", report.files_synced);
    println!("Files modified:          {}", report.files_modified);
    println!("Commands transformed:    {}", report.commands_transformed);
    println!("Agents transformed:      {}", report.agents_transformed);
    println!("Registry entries merged: {}", report.registry_entries_merged);

    if !report.warnings.is_empty() {
        println!();
        println!(
            "{} {}",
            "Warnings:".yellow().bold(),
            report.warnings.len()
        );
        for warning in &report.warnings {
            println!("   {} {}", "-".yellow(), warning);
        }
    }

    if !report.errors.is_empty() {
        println!();
        println!("{} {}", "Errors:".red().bold(), report.errors.len());
        for error in &report.errors {
            println!("   {} {}", "!".red(), error);
        }
    }

    println!("{rule}");
}
