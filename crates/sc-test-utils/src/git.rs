//! Git repository fixtures.
//!
//! Everything goes through `git2` so tests do not depend on a `git` binary or
//! on the user's global git configuration.

use std::fs;
use std::path::Path;

/// Initialises a real git repository with no commits.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Writes `files` (relative path, content) below `path`.
///
/// # Panics
/// Panics if any write fails.
pub fn write_files(path: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let full = path.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_files: failed to create {}: {e}", parent.display()));
        }
        fs::write(&full, content)
            .unwrap_or_else(|e| panic!("write_files: failed to write {}: {e}", full.display()));
    }
}

/// Stages everything in the working tree, deletions included, and commits it on `HEAD`.
///
/// Returns the new commit id as hex.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(repo: &git2::Repository, message: &str) -> String {
    let mut index = repo.index().expect("commit_all: index");
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .expect("commit_all: add_all");
    index
        .update_all(["*"].iter(), None)
        .expect("commit_all: update_all");
    index.write().expect("commit_all: index write");
    let tree_id = index.write_tree().expect("commit_all: write_tree");
    let tree = repo.find_tree(tree_id).expect("commit_all: find_tree");
    let signature =
        git2::Signature::now("Test User", "test@test.com").expect("commit_all: signature");

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .expect("commit_all: commit")
        .to_string()
}

/// Initialises a repository at `path`, writes `files` and commits them.
///
/// Returns the commit id as hex.
pub fn upstream_repo_with_commit(path: &Path, files: &[(&str, &str)]) -> String {
    let repo = real_git_repo(path);
    write_files(path, files);
    commit_all(&repo, "Initial commit")
}
