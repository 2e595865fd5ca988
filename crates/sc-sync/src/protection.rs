//! Non-overwrite guarantee over plugin-owned paths
//!
//! A [`ProtectionSnapshot`] is taken before any content is written and
//! checked again once syncing is done. Any protected file that changed or
//! disappeared in between fails the run.

use crate::Result;
use sc_fs::{Checksum, FileSystem, NormalizedPath, walk_files};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Root-relative path to digest of every protected file at snapshot time.
pub type ProtectionSnapshot = BTreeMap<NormalizedPath, Checksum>;

/// How a protected file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Modified,
    Deleted,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// A single protected file that did not survive the run intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: NormalizedPath,
    pub kind: ViolationKind,
}

/// Every protected file that was altered, in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionViolation {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ProtectionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listed: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{} ({})", v.path, v.kind))
            .collect();
        write!(f, "Protected files were altered: {}", listed.join(", "))
    }
}

impl std::error::Error for ProtectionViolation {}

/// Snapshots and re-validates protected paths under a plugin root.
pub struct ProtectionGuard<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
}

impl<'a> ProtectionGuard<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: &'a Path) -> Self {
        Self { fs, root }
    }

    /// Hash every file covered by `protected`.
    ///
    /// A protected file is hashed directly, a protected directory contributes
    /// every file below it, and a missing path contributes nothing.
    pub fn snapshot(&self, protected: &[NormalizedPath]) -> Result<ProtectionSnapshot> {
        let mut snapshot = ProtectionSnapshot::new();

        for entry in protected {
            let path = entry.under(self.root);
            if self.fs.is_file(&path) {
                snapshot.insert(entry.clone(), Checksum::of_bytes(&self.fs.read(&path)?));
            } else if self.fs.is_dir(&path) {
                for file in walk_files(self.fs, &path)? {
                    if let Some(key) = NormalizedPath::relative_to(&file, self.root) {
                        snapshot.insert(key, Checksum::of_bytes(&self.fs.read(&file)?));
                    }
                }
            } else {
                tracing::debug!("Protected path not present: {}", entry);
            }
        }

        tracing::info!("Protected {} files", snapshot.len());
        Ok(snapshot)
    }

    /// Re-hash every snapshot entry and fail if any changed or vanished.
    pub fn validate(&self, snapshot: &ProtectionSnapshot) -> Result<()> {
        let mut violations = Vec::new();

        for (key, expected) in snapshot {
            let path = key.under(self.root);
            if !self.fs.is_file(&path) {
                violations.push(Violation {
                    path: key.clone(),
                    kind: ViolationKind::Deleted,
                });
                continue;
            }
            if Checksum::of_bytes(&self.fs.read(&path)?) != *expected {
                violations.push(Violation {
                    path: key.clone(),
                    kind: ViolationKind::Modified,
                });
            }
        }

        if violations.is_empty() {
            tracing::info!("All {} protected files intact", snapshot.len());
            Ok(())
        } else {
            Err(ProtectionViolation { violations }.into())
        }
    }
}
