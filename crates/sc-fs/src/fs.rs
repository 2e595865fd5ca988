//! Filesystem trait with disk and in-memory implementations
//!
//! Sync components only touch the plugin tree through [`FileSystem`], which
//! keeps every mutation behind one seam. [`RealFs`] is used by the binary;
//! [`MemoryFs`] lets the orchestrator state machine run in tests without a
//! disk.

use crate::{Error, Result, io};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One entry returned by [`FileSystem::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    /// File name of the entry as UTF-8, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Operations the sync pipeline needs from a filesystem.
pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write `contents`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Direct children of `path`, sorted by path.
    ///
    /// Only regular files and directories are listed. A symlink is listed
    /// when it resolves to a regular file.
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Rename a file. The destination's parent must exist.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 {
            path: path.to_path_buf(),
        })
    }
}

/// Every regular file below `dir`, recursively, in sorted order.
///
/// A missing `dir` yields an empty list.
pub fn walk_files(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(dir) {
        return Ok(files);
    }
    for entry in fs.list_dir(dir)? {
        if entry.is_dir {
            files.extend(walk_files(fs, &entry.path)?);
        } else {
            files.push(entry.path);
        }
    }
    Ok(files)
}

/// The local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        io::write_atomic(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| Error::io(path, e))? {
            let entry = entry.map_err(|e| Error::io(path, e))?;
            let entry_path = entry.path();
            let file_type = entry.file_type().map_err(|e| Error::io(&entry_path, e))?;
            let is_dir = if file_type.is_symlink() {
                // Linked files are followed; linked directories and dangling links are skipped
                match std::fs::metadata(&entry_path) {
                    Ok(target) if target.is_file() => false,
                    _ => {
                        tracing::debug!(path = %entry_path.display(), "skipping symlink");
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                true
            } else if file_type.is_file() {
                false
            } else {
                continue;
            };
            entries.push(DirEntry {
                path: entry_path,
                is_dir,
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to).map_err(|e| Error::io(from, e))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| Error::io(path, e))
    }
}

#[derive(Debug, Default)]
struct MemoryTree {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryTree {
    fn add_ancestors(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() || !self.dirs.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
    }
}

/// An in-memory filesystem.
///
/// Paths are used verbatim as keys, so callers should stick to absolute,
/// already-normalized paths such as `/plugin/commands/sc-a.md`.
#[derive(Debug, Default)]
pub struct MemoryFs {
    tree: Mutex<MemoryTree>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for test setup: write a UTF-8 file.
    pub fn insert(&self, path: impl AsRef<Path>, contents: &str) {
        let path = path.as_ref();
        let mut tree = self.lock();
        tree.files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        tree.add_ancestors(path);
    }

    /// Every file path currently stored, sorted.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Error::not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut tree = self.lock();
        if tree.dirs.contains(path) {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::IsADirectory, "is a directory"),
            ));
        }
        tree.files.insert(path.to_path_buf(), contents.to_vec());
        tree.add_ancestors(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.lock();
        tree.files.contains_key(path) || tree.dirs.contains(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let tree = self.lock();
        if !tree.dirs.contains(path) {
            return Err(Error::not_found(path));
        }
        let is_child = |p: &PathBuf| p.parent() == Some(path);
        let mut entries: Vec<DirEntry> = tree
            .files
            .keys()
            .filter(|p| is_child(p))
            .map(|p| DirEntry {
                path: p.clone(),
                is_dir: false,
            })
            .chain(tree.dirs.iter().filter(|p| is_child(p)).map(|p| DirEntry {
                path: p.clone(),
                is_dir: true,
            }))
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut tree = self.lock();
        if tree.files.contains_key(path) {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file exists"),
            ));
        }
        tree.dirs.insert(path.to_path_buf());
        tree.add_ancestors(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut tree = self.lock();
        let contents = tree.files.remove(from).ok_or_else(|| Error::not_found(from))?;
        tree.files.insert(to.to_path_buf(), contents);
        tree.add_ancestors(to);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(path))
    }
}
