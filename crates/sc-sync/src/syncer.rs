//! Directory-level sync of Framework content into the plugin tree

use crate::Result;
use crate::journal::SyncJournal;
use crate::vcs::HistoryRename;
use sc_fs::{FileSystem, walk_files};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Extension of the files `sync_directory` picks up.
pub const CONTENT_EXTENSION: &str = "md";

/// Content rewrite applied to each file: `(text, source file name) -> text`.
pub type TransformFn<'a> = &'a dyn Fn(&str, &str) -> String;

/// Counters for one `sync_directory` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Destination file did not exist before
    pub synced: usize,
    /// Destination file existed and was overwritten
    pub modified: usize,
    /// Unprefixed destination file moved to its prefixed name
    pub renamed: usize,
    /// Stale prefixed destination file deleted
    pub removed: usize,
}

impl SyncStats {
    /// Files written in this call, new or overwritten.
    pub fn transformed(&self) -> usize {
        self.synced + self.modified
    }
}

fn has_content_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == CONTENT_EXTENSION)
}

/// Copies source directories onto destination directories.
///
/// In dry-run mode nothing is written, renamed or deleted, but the returned
/// counters are the ones a real run would produce.
pub struct FileSyncer<'a> {
    fs: &'a dyn FileSystem,
    history: Option<&'a dyn HistoryRename>,
    dry_run: bool,
}

impl<'a> FileSyncer<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        history: Option<&'a dyn HistoryRename>,
        dry_run: bool,
    ) -> Self {
        Self {
            fs,
            history,
            dry_run,
        }
    }

    /// Sync the top-level `*.md` files of `source_dir` into `dest_dir`.
    ///
    /// Each file lands as `<filename_prefix><name>`, rewritten by `transform`
    /// when one is given. An unprefixed copy already at the destination is
    /// renamed first. Prefixed destination files without a source counterpart
    /// are deleted; unprefixed ones are not owned by the sync and stay.
    pub fn sync_directory(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        filename_prefix: &str,
        transform: Option<TransformFn<'_>>,
        journal: &mut SyncJournal,
    ) -> Result<SyncStats> {
        let mut stats = SyncStats::default();

        if !self.fs.is_dir(source_dir) {
            journal.warn(format!(
                "Source directory not found: {}",
                source_dir.display()
            ));
            return Ok(stats);
        }

        let existing: Vec<String> = if self.fs.is_dir(dest_dir) {
            self.fs
                .list_dir(dest_dir)?
                .into_iter()
                .filter(|e| !e.is_dir)
                .map(|e| e.file_name())
                .filter(|name| has_content_extension(name))
                .collect()
        } else {
            Vec::new()
        };

        if !self.dry_run {
            self.fs.create_dir_all(dest_dir)?;
        }

        let mut produced = BTreeSet::new();
        let mut renamed_away = BTreeSet::new();

        for entry in self.fs.list_dir(source_dir)? {
            let name = entry.file_name();
            if entry.is_dir || !has_content_extension(&name) {
                continue;
            }

            let new_name = format!("{filename_prefix}{name}");
            let dest = dest_dir.join(&new_name);
            produced.insert(new_name.clone());

            let text = self.fs.read_to_string(&entry.path)?;
            let content = match transform {
                Some(f) => f(&text, &name),
                None => text,
            };

            let old = dest_dir.join(&name);
            let renamed = new_name != name && self.fs.is_file(&old);
            if renamed {
                self.rename(&old, &dest, journal)?;
                renamed_away.insert(name.clone());
                stats.renamed += 1;
                tracing::info!("Renamed: {} -> {}", name, new_name);
            }

            let existed = renamed || self.fs.exists(&dest);
            if !self.dry_run {
                let unchanged = existed
                    && self
                        .fs
                        .read(&dest)
                        .is_ok_and(|current| current == content.as_bytes());
                if !unchanged {
                    self.fs.write(&dest, content.as_bytes())?;
                }
            }

            if existed {
                stats.modified += 1;
            } else {
                stats.synced += 1;
            }
        }

        for name in existing {
            if !name.starts_with(filename_prefix)
                || produced.contains(&name)
                || renamed_away.contains(&name)
            {
                continue;
            }
            let stale = dest_dir.join(&name);
            if self.dry_run {
                tracing::info!("[dry-run] Would remove: {}", stale.display());
            } else {
                self.fs.remove_file(&stale)?;
                tracing::info!("Removed: {}", stale.display());
            }
            stats.removed += 1;
        }

        tracing::debug!(
            source = %source_dir.display(),
            synced = stats.synced,
            modified = stats.modified,
            renamed = stats.renamed,
            removed = stats.removed,
            "directory synced"
        );
        Ok(stats)
    }

    /// Recursively copy every file of `source_dir` into `dest_dir` unchanged.
    ///
    /// No renaming, no transform and no stale deletion. Returns the number of
    /// files copied.
    pub fn copy_directory(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        journal: &mut SyncJournal,
    ) -> Result<usize> {
        if !self.fs.is_dir(source_dir) {
            journal.warn(format!(
                "Source directory not found: {}",
                source_dir.display()
            ));
            return Ok(0);
        }

        let mut count = 0;
        for file in walk_files(self.fs, source_dir)? {
            let Ok(rel) = file.strip_prefix(source_dir) else {
                continue;
            };
            if !self.dry_run {
                let bytes = self.fs.read(&file)?;
                self.fs.write(&dest_dir.join(rel), &bytes)?;
            }
            tracing::debug!("Copied: {}", rel.display());
            count += 1;
        }
        Ok(count)
    }

    fn rename(&self, from: &Path, to: &Path, journal: &mut SyncJournal) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                "[dry-run] Would rename {} -> {}",
                from.display(),
                to.display()
            );
            return Ok(());
        }

        if let Some(history) = self.history {
            match history.rename(from, to) {
                Ok(()) => return Ok(()),
                Err(e) => journal.warn(format!(
                    "{} rename of {} failed, using plain rename: {}",
                    history.name(),
                    from.display(),
                    e
                )),
            }
        }

        self.fs.rename(from, to)?;
        Ok(())
    }
}
