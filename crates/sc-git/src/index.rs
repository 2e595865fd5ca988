//! History-preserving renames through the git index
//!
//! Equivalent of `git mv`: the file is renamed on disk and the index entry is
//! moved, so the next commit records a rename rather than a delete plus add.

use crate::{Error, Result};
use git2::Repository;
use std::path::{Path, PathBuf};

/// Whether `path` is inside a git working tree.
pub fn is_repository(path: &Path) -> bool {
    Repository::discover(path)
        .map(|repo| repo.workdir().is_some())
        .unwrap_or(false)
}

/// Path of `path` relative to `workdir`, resolving symlinked temp dirs.
///
/// Only the parent of `path` needs to exist.
fn relative_in_workdir(workdir: &Path, path: &Path) -> Result<PathBuf> {
    let io_err = |p: &Path, source| Error::Io {
        path: p.to_path_buf(),
        source,
    };
    let workdir = workdir.canonicalize().map_err(|e| io_err(workdir, e))?;
    let parent = path.parent().unwrap_or(Path::new("."));
    let file_name = path.file_name().ok_or_else(|| Error::OutsideWorkdir {
        path: path.to_path_buf(),
    })?;
    let resolved = parent
        .canonicalize()
        .map_err(|e| io_err(parent, e))?
        .join(file_name);

    resolved
        .strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| Error::OutsideWorkdir {
            path: path.to_path_buf(),
        })
}

/// Rename a tracked file and record the move in the index.
///
/// Fails with [`Error::NotTracked`] before touching the disk when `from` is
/// not in the index, so callers can fall back to a plain rename. If the index
/// cannot be updated (for example while `index.lock` is held) the disk rename
/// is undone before the error is returned.
pub fn move_tracked(repo_root: &Path, from: &Path, to: &Path) -> Result<()> {
    let repo = Repository::discover(repo_root).map_err(|_| Error::NotARepository {
        path: repo_root.to_path_buf(),
    })?;
    let workdir = repo.workdir().ok_or_else(|| Error::NotARepository {
        path: repo_root.to_path_buf(),
    })?;

    let rel_from = relative_in_workdir(workdir, from)?;
    let rel_to = relative_in_workdir(workdir, to)?;

    let mut index = repo.index()?;
    if index.get_path(&rel_from, 0).is_none() {
        return Err(Error::NotTracked {
            path: from.to_path_buf(),
        });
    }

    std::fs::rename(from, to).map_err(|e| Error::Io {
        path: from.to_path_buf(),
        source: e,
    })?;

    let staged = index
        .remove_path(&rel_from)
        .and_then(|()| index.add_path(&rel_to))
        .and_then(|()| index.write());
    if let Err(e) = staged {
        // Put the file back so the caller sees it untouched
        std::fs::rename(to, from).map_err(|undo| Error::Io {
            path: to.to_path_buf(),
            source: undo,
        })?;
        return Err(e.into());
    }

    tracing::debug!(from = %rel_from.display(), to = %rel_to.display(), "git index move");
    Ok(())
}
