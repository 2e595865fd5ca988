//! Layout command implementation

use std::path::Path;

use colored::Colorize;

use sc_sync::{MappingMode, SyncConfig, SyncPlan};

use super::load_config;
use crate::error::Result;

/// Run the layout command
///
/// Prints the mapping table and protected paths. Returns `false` when the
/// layout is rejected, e.g. a destination overlaps a protected path.
pub fn run_layout(config: Option<&Path>) -> Result<bool> {
    let config = load_config(config)?;
    print_layout(&config);

    match SyncPlan::validate(&config) {
        Ok(()) => {
            println!();
            println!("{} Layout is valid.", "OK".green().bold());
            Ok(true)
        }
        Err(e) => {
            println!();
            println!("{} {}", "INVALID".red().bold(), e);
            Ok(false)
        }
    }
}

fn print_layout(config: &SyncConfig) {
    println!("{} {}", "Namespace:".bold(), config.namespace.cyan());
    println!("{} {}", "Source:".bold(), config.source_repo);

    println!();
    println!("{}", "Mappings:".bold());
    for mapping in &config.mappings {
        let how = match &mapping.mode {
            MappingMode::Namespaced {
                filename_prefix,
                transform,
            } => format!("prefix '{filename_prefix}', {transform:?} transform"),
            MappingMode::Mirror => "mirror".to_string(),
        };
        println!(
            "   {} {} -> {} ({})",
            "+".green(),
            mapping.source,
            mapping.destination.cyan(),
            how.dimmed()
        );
    }

    println!();
    println!("{}", "Protected:".bold());
    for path in &config.protected {
        println!("   {} {}", "#".yellow(), path);
    }
}
