//! Error types for sc-sync

use crate::protection::ProtectionViolation;

/// Result type for sc-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sc-sync operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Upstream tree could not be fetched
    #[error("Failed to acquire source tree from {source_repo}: {message}")]
    SourceAcquisition {
        source_repo: String,
        message: String,
    },

    /// Sync touched plugin-owned files
    #[error(transparent)]
    ProtectionViolation(#[from] ProtectionViolation),

    /// A mapping destination overlaps a protected path
    #[error("Sync mapping destination '{destination}' overlaps protected path '{protected}'")]
    LayoutConflict {
        destination: String,
        protected: String,
    },

    /// Invalid sync configuration
    #[error("Invalid sync configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from sc-fs
    #[error(transparent)]
    Fs(#[from] sc_fs::Error),

    /// Git error from sc-git
    #[error(transparent)]
    Git(#[from] sc_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_protection_violation(&self) -> bool {
        matches!(self, Self::ProtectionViolation(_))
    }
}
