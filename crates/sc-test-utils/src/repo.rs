//! [`TestTree`] builder for plugin roots and Framework checkouts.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::git;

/// A temporary directory with helpers for writing and asserting files.
///
/// # Example
///
/// ```rust,no_run
/// use sc_test_utils::repo::TestTree;
///
/// let plugin = TestTree::new();
/// plugin.write("README.md", "# Plugin");
/// plugin.assert_file_contains("README.md", "Plugin");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// A Framework checkout with the standard layout, committed to git.
    ///
    /// `commands` and `agents` are `(file name, content)` pairs placed under
    /// `src/superclaude/commands` and `src/superclaude/agents`.
    pub fn framework(commands: &[(&str, &str)], agents: &[(&str, &str)]) -> Self {
        let tree = Self::new();
        let mut files: Vec<(String, &str)> = Vec::new();
        for (name, content) in commands {
            files.push((format!("src/superclaude/commands/{name}"), content));
        }
        for (name, content) in agents {
            files.push((format!("src/superclaude/agents/{name}"), content));
        }
        let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), *c)).collect();
        git::upstream_repo_with_commit(tree.root(), &borrowed);
        tree
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a string, for CLI arguments and clone URLs.
    pub fn root_str(&self) -> &str {
        self.root().to_str().expect("temp dir path is not UTF-8")
    }

    /// Initialise the directory as a git repository.
    pub fn init_git(&self) -> git2::Repository {
        git::real_git_repo(self.root())
    }

    /// Commit the current working tree, returning the commit id.
    ///
    /// # Panics
    /// Panics if the root is not a git repository.
    pub fn commit(&self, message: &str) -> String {
        let repo = git2::Repository::open(self.root())
            .unwrap_or_else(|e| panic!("TestTree::commit: not a repository: {e}"));
        git::commit_all(&repo, message)
    }

    /// Write a file relative to the root, creating parents.
    pub fn write(&self, path: &str, content: &str) {
        git::write_files(self.root(), &[(path, content)]);
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
