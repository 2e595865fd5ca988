//! Cloning and revision lookup

use crate::{Error, Result};
use git2::{FetchOptions, Repository, build::RepoBuilder};
use std::path::Path;

/// Whether `url` goes through a network transport.
///
/// Local paths and `file://` URLs are cloned without `--depth`, which the
/// local transport does not support.
pub fn is_remote_url(url: &str) -> bool {
    ["http://", "https://", "ssh://", "git://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
        || (url.contains('@') && url.contains(':') && !url.contains("://"))
}

/// Clone `url` into `dest`.
///
/// Remote URLs are fetched shallowly (depth 1) since only the tip tree is
/// synced. `dest` must not exist or be empty.
pub fn clone_repo(url: &str, dest: &Path) -> Result<Repository> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Clone {
            url: url.to_string(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }

    let mut builder = RepoBuilder::new();
    if is_remote_url(url) {
        let mut fetch = FetchOptions::new();
        fetch.depth(1);
        builder.fetch_options(fetch);
    }

    tracing::debug!(url, dest = %dest.display(), "cloning");
    builder.clone(url, dest).map_err(|e| Error::Clone {
        url: url.to_string(),
        message: e.message().to_string(),
    })
}

/// Full hex id of the commit `HEAD` points at.
pub fn head_commit(repo_path: &Path) -> Result<String> {
    let repo = Repository::open(repo_path).map_err(|_| Error::NotARepository {
        path: repo_path.to_path_buf(),
    })?;
    let commit = repo.head()?.peel_to_commit()?;
    Ok(commit.id().to_string())
}
