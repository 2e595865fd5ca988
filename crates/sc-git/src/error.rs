//! Error types for sc-git

use std::path::PathBuf;

/// Result type for sc-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sc-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Failed to clone {url}: {message}")]
    Clone { url: String, message: String },

    #[error("No git repository at {path}")]
    NotARepository { path: PathBuf },

    #[error("{path} is not tracked by git")]
    NotTracked { path: PathBuf },

    #[error("{path} is outside the repository working tree")]
    OutsideWorkdir { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
