//! Final record of a sync run

use crate::Result;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// No fatal error occurred
    pub success: bool,
    /// RFC 3339 time the run started
    pub timestamp: String,
    pub source_commit: String,
    pub source_version: String,
    /// Files created, including mirrored copies
    pub files_synced: usize,
    /// Existing files overwritten
    pub files_modified: usize,
    pub commands_transformed: usize,
    pub agents_transformed: usize,
    pub registry_entries_merged: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl SyncReport {
    /// An empty report stamped with the current time.
    pub fn started() -> Self {
        Self {
            success: false,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source_commit: String::new(),
            source_version: String::new(),
            files_synced: 0,
            files_modified: 0,
            commands_transformed: 0,
            agents_transformed: 0,
            registry_entries_merged: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut json = self.to_json()?;
        json.push('\n');
        sc_fs::io::write_atomic(path, json.as_bytes())?;
        tracing::info!("Report saved to {}", path.display());
        Ok(())
    }
}
