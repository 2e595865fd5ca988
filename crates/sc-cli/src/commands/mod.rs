//! Command implementations for sc-cli

pub mod layout;
pub mod sync;

pub use layout::run_layout;
pub use sync::{SyncArgs, run_sync};

use crate::error::Result;
use sc_sync::SyncConfig;
use std::path::Path;

/// The built-in layout, or the one in `path`.
pub fn load_config(path: Option<&Path>) -> Result<SyncConfig> {
    match path {
        Some(path) => Ok(SyncConfig::load(path)?),
        None => Ok(SyncConfig::default()),
    }
}
