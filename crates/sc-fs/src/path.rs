//! Normalized path handling for root-relative keys

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Used for the root-relative keys that identify plugin files across a sync
/// run, independent of the platform separator. Trailing slashes are dropped,
/// so `core/` and `core` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let mut normalized = path_str.replace('\\', "/");
        while normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        Self { inner: normalized }
    }

    /// Build the key of `path` relative to `root`.
    ///
    /// Returns `None` when `path` is not below `root`.
    pub fn relative_to(path: &Path, root: &Path) -> Option<Self> {
        path.strip_prefix(root).ok().map(Self::new)
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Resolve this key against a root directory.
    pub fn under(&self, root: &Path) -> PathBuf {
        self.inner.split('/').filter(|s| !s.is_empty()).fold(
            root.to_path_buf(),
            |acc, segment| acc.join(segment),
        )
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if self.inner.is_empty() {
            return Self::new(segment_normalized);
        }
        Self::new(format!("{}/{}", self.inner, segment_normalized))
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Whether `self` is `other` or lies below it, compared segment-wise.
    ///
    /// `commands/sc-a.md` is within `commands`, `commandsx` is not.
    pub fn is_within(&self, other: &NormalizedPath) -> bool {
        if other.inner.is_empty() {
            return true;
        }
        match self.inner.strip_prefix(&other.inner) {
            Some("") => true,
            Some(rest) => rest.starts_with('/'),
            None => false,
        }
    }

    /// Whether either path lies within the other.
    pub fn overlaps(&self, other: &NormalizedPath) -> bool {
        self.is_within(other) || other.is_within(self)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
