//! History-preserving rename strategies

use crate::Result;
use std::path::{Path, PathBuf};

/// A way to rename a file so version control records it as a move.
pub trait HistoryRename: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    /// Rename `from` to `to`. On error the file must still be at `from`.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Renames through the git index of the repository containing `root`.
#[derive(Debug, Clone)]
pub struct GitHistory {
    root: PathBuf,
}

impl GitHistory {
    /// `Some` when `root` is inside a git working tree.
    pub fn detect(root: &Path) -> Option<Self> {
        if sc_git::is_repository(root) {
            Some(Self {
                root: root.to_path_buf(),
            })
        } else {
            tracing::warn!(
                root = %root.display(),
                "git not available - renames will not preserve history"
            );
            None
        }
    }
}

impl HistoryRename for GitHistory {
    fn name(&self) -> &str {
        "git"
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        sc_git::move_tracked(&self.root, from, to)?;
        Ok(())
    }
}
