//! Per-run collector for non-fatal anomalies
//!
//! Components receive a `&mut SyncJournal` instead of writing to shared
//! state. Every entry is also emitted through `tracing` so it shows up in the
//! console log as it happens.

/// Warnings accumulated during one sync run, in the order they occurred.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncJournal {
    warnings: Vec<String>,
}

impl SyncJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning that must reach the final report.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}
