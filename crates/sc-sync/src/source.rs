//! Upstream source acquisition

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Commit id reported when the upstream revision cannot be determined.
pub const UNKNOWN_COMMIT: &str = "unknown";

/// An upstream tree materialized inside the run's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredSource {
    pub root: PathBuf,
    pub commit: String,
}

/// Materializes the upstream Framework tree for one run.
pub trait SourceProvider: Send + Sync {
    /// Human-readable origin, used in logs and errors.
    fn describe(&self) -> String;

    /// Place the upstream tree somewhere below `workdir`.
    fn acquire(&self, workdir: &Path) -> Result<AcquiredSource>;
}

/// Clones a git repository, shallowly when it is remote.
#[derive(Debug, Clone)]
pub struct GitSource {
    url: String,
}

impl GitSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl SourceProvider for GitSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn acquire(&self, workdir: &Path) -> Result<AcquiredSource> {
        let root = workdir.join("framework");
        tracing::info!("Cloning {}", self.url);

        sc_git::clone_repo(&self.url, &root).map_err(|e| Error::SourceAcquisition {
            source_repo: self.url.clone(),
            message: e.to_string(),
        })?;

        let commit = sc_git::head_commit(&root).unwrap_or_else(|e| {
            tracing::debug!("Could not resolve upstream HEAD: {}", e);
            UNKNOWN_COMMIT.to_string()
        });
        tracing::info!("Cloned at commit {}", commit);

        Ok(AcquiredSource { root, commit })
    }
}
