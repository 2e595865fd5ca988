//! The sync run state machine
//!
//! ```text
//! Init -> SourceAcquired -> SnapshotTaken -> ContentSynced
//!      -> ProtectionValidated -> ManifestRegenerated -> ConfigMerged
//!      -> Validated -> Done
//! ```
//!
//! Any fatal error moves the run to `Failed` and skips the remaining steps.
//! The temporary working directory is removed before `Done` on every path.

use crate::journal::SyncJournal;
use crate::manifest::{self, LOCAL_MANIFEST, ManifestWriter};
use crate::plan::{ContentKind, MappingMode, SyncMapping, SyncPlan};
use crate::protection::ProtectionGuard;
use crate::registry::{ServiceRegistry, merge_registries, registry_of};
use crate::report::SyncReport;
use crate::source::{GitSource, SourceProvider};
use crate::syncer::{FileSyncer, TransformFn};
use crate::transform::Transform;
use crate::vcs::{GitHistory, HistoryRename};
use crate::{Error, Result};
use chrono::Local;
use sc_fs::{FileSystem, RealFs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of the per-run temporary directory.
pub const WORKDIR_PREFIX: &str = "sc_framework_";

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Init,
    SourceAcquired,
    SnapshotTaken,
    ContentSynced,
    ProtectionValidated,
    ManifestRegenerated,
    ConfigMerged,
    Validated,
    Done,
    Failed,
}

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,
}

/// Drives one Framework to Plugin sync.
pub struct SyncOrchestrator {
    plan: SyncPlan,
    root: PathBuf,
    options: SyncOptions,
    fs: Arc<dyn FileSystem>,
    source: Box<dyn SourceProvider>,
    renamer: Option<Box<dyn HistoryRename>>,
    state: SyncState,
    visited: Vec<SyncState>,
}

impl SyncOrchestrator {
    pub fn new(
        plan: SyncPlan,
        root: impl Into<PathBuf>,
        options: SyncOptions,
        fs: Arc<dyn FileSystem>,
        source: Box<dyn SourceProvider>,
        renamer: Option<Box<dyn HistoryRename>>,
    ) -> Self {
        Self {
            plan,
            root: root.into(),
            options,
            fs,
            source,
            renamer,
            state: SyncState::Init,
            visited: Vec::new(),
        }
    }

    /// Sync the plan's git repository into a plugin root on disk.
    ///
    /// Renames go through the git index when `root` is a git working tree.
    pub fn for_plugin_root(plan: SyncPlan, root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        let root = root.into();
        let source = Box::new(GitSource::new(plan.source_repo()));
        let renamer = GitHistory::detect(&root).map(|g| Box::new(g) as Box<dyn HistoryRename>);
        Self::new(plan, root, options, Arc::new(RealFs), source, renamer)
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// States visited by the last run, in order.
    pub fn history(&self) -> &[SyncState] {
        &self.visited
    }

    /// Execute the whole run.
    ///
    /// Never returns an error: fatal failures end up in
    /// [`SyncReport::errors`] with `success = false`, and counts gathered
    /// before the failure are kept.
    pub fn run(&mut self) -> SyncReport {
        let mut report = SyncReport::started();
        let mut journal = SyncJournal::new();

        self.visited.clear();
        self.enter(SyncState::Init);
        if self.options.dry_run {
            tracing::info!("Dry run - no files will be written");
        }

        let outcome = self.run_in_workdir(&mut report, &mut journal);

        match outcome {
            Ok(()) => report.success = true,
            Err(e) => {
                tracing::error!("Sync failed: {}", e);
                if e.is_protection_violation() {
                    tracing::error!("No mapping may write into a protected path; check the sync layout");
                }
                report.errors.push(e.to_string());
                self.enter(SyncState::Failed);
            }
        }
        report.warnings = journal.into_warnings();
        self.enter(SyncState::Done);
        report
    }

    fn enter(&mut self, state: SyncState) {
        tracing::debug!(?state, "sync state");
        self.state = state;
        self.visited.push(state);
    }

    fn run_in_workdir(&mut self, report: &mut SyncReport, journal: &mut SyncJournal) -> Result<()> {
        let workdir = tempfile::Builder::new().prefix(WORKDIR_PREFIX).tempdir()?;
        let result = self.run_steps(workdir.path(), report, journal);

        let path = workdir.path().to_path_buf();
        match workdir.close() {
            Ok(()) => tracing::debug!("Cleaned up {}", path.display()),
            Err(e) => journal.warn(format!(
                "Failed to remove temporary directory {}: {}",
                path.display(),
                e
            )),
        }
        result
    }

    fn run_steps(
        &mut self,
        workdir: &Path,
        report: &mut SyncReport,
        journal: &mut SyncJournal,
    ) -> Result<()> {
        let fs = Arc::clone(&self.fs);
        let fs = fs.as_ref();
        let root = self.root.clone();
        let dry_run = self.options.dry_run;

        let source = self.source.acquire(workdir).map_err(|e| match e {
            Error::SourceAcquisition { .. } => e,
            other => Error::SourceAcquisition {
                source_repo: self.source.describe(),
                message: other.to_string(),
            },
        })?;
        report.source_commit = source.commit.clone();
        report.source_version = manifest::resolve_version(fs, &source.root, &root);
        self.enter(SyncState::SourceAcquired);

        let guard = ProtectionGuard::new(fs, &root);
        let snapshot = guard.snapshot(self.plan.protected())?;
        let writer = ManifestWriter::new(fs, &root, dry_run);
        writer.backup_local(Local::now())?;
        self.enter(SyncState::SnapshotTaken);

        let processed = self.sync_content(fs, &source.root, report, journal)?;
        self.enter(SyncState::ContentSynced);

        guard.validate(&snapshot)?;
        self.enter(SyncState::ProtectionValidated);

        let local = writer.read_local(journal);
        let mut distribution =
            writer.generate(self.plan.transformer().namespace(), &report.source_version, &local);
        let mut commands = 0;
        for mapping in self.plan.mappings() {
            if let (ContentKind::Commands, Some(prefix)) = (mapping.kind, mapping.filename_prefix()) {
                commands += manifest::count_prefixed(fs, &mapping.destination_path().under(&root), prefix)?;
            }
        }
        tracing::info!("Generated {} with {} commands", manifest::DISTRIBUTION_MANIFEST, commands);
        self.enter(SyncState::ManifestRegenerated);

        let upstream = load_upstream_registry(fs, &source.root.join(LOCAL_MANIFEST), journal);
        let merge = merge_registries(&upstream, &local.registry());
        for warning in merge.warnings {
            journal.warn(warning);
        }
        distribution.mcp_servers = merge.merged;
        writer.write_distribution(&distribution)?;
        writer.store_local_registry(&local, &distribution.mcp_servers)?;
        report.registry_entries_merged = distribution.mcp_servers.len();
        tracing::info!("Service registry entries merged: {}", distribution.mcp_servers.len());
        self.enter(SyncState::ConfigMerged);

        if !dry_run {
            for (mapping, processed) in &processed {
                let Some(prefix) = mapping.filename_prefix() else {
                    continue;
                };
                let dest = mapping.destination_path().under(&root);
                let found = manifest::count_prefixed(fs, &dest, prefix)?;
                if found < *processed {
                    journal.warn(format!(
                        "Expected {} {}*.md files in {}, found {}",
                        processed, prefix, mapping.destination, found
                    ));
                } else {
                    tracing::info!("Found {} {}*.md files in {}", found, prefix, mapping.destination);
                }
            }
            if !fs.is_file(&writer.distribution_path()) {
                journal.warn(format!(
                    "{} not found after sync",
                    manifest::DISTRIBUTION_MANIFEST
                ));
            }
        }
        self.enter(SyncState::Validated);

        Ok(())
    }

    /// Run every mapping, returning how many files each namespaced one processed.
    fn sync_content(
        &self,
        fs: &dyn FileSystem,
        source_root: &Path,
        report: &mut SyncReport,
        journal: &mut SyncJournal,
    ) -> Result<Vec<(SyncMapping, usize)>> {
        let syncer = FileSyncer::new(fs, self.renamer.as_deref(), self.options.dry_run);
        let transformer = self.plan.transformer();
        let mut processed = Vec::new();

        for mapping in self.plan.mappings() {
            let src = mapping.source_path().under(source_root);
            let dest = mapping.destination_path().under(&self.root);

            match &mapping.mode {
                MappingMode::Namespaced {
                    filename_prefix,
                    transform,
                } => {
                    let kind = *transform;
                    let rewrite = move |text: &str, name: &str| kind.apply(transformer, text, name);
                    let transform_fn: Option<TransformFn<'_>> = match kind {
                        Transform::None => None,
                        _ => Some(&rewrite),
                    };

                    let stats =
                        syncer.sync_directory(&src, &dest, filename_prefix, transform_fn, journal)?;
                    report.files_synced += stats.synced;
                    report.files_modified += stats.modified;
                    match mapping.kind {
                        ContentKind::Commands => report.commands_transformed += stats.transformed(),
                        ContentKind::Agents => report.agents_transformed += stats.transformed(),
                        ContentKind::Assets => {}
                    }
                    tracing::info!("{}: {} transformed", mapping.destination, stats.transformed());
                    processed.push((mapping.clone(), stats.transformed()));
                }
                MappingMode::Mirror => {
                    let copied = syncer.copy_directory(&src, &dest, journal)?;
                    report.files_synced += copied;
                    tracing::info!("{}: {} copied", mapping.destination, copied);
                }
            }
        }

        Ok(processed)
    }
}

/// The `mcpServers` of the upstream manifest.
///
/// Empty when the file is absent, or unusable with a warning.
fn load_upstream_registry(fs: &dyn FileSystem, path: &Path, journal: &mut SyncJournal) -> ServiceRegistry {
    match manifest::read_json(fs, path) {
        Ok(None) => ServiceRegistry::new(),
        Ok(Some(value)) if value.is_object() => registry_of(&value),
        Ok(Some(_)) => {
            journal.warn(format!("Failed to read upstream {LOCAL_MANIFEST}: not a JSON object"));
            ServiceRegistry::new()
        }
        Err(e) => {
            journal.warn(format!("Failed to read upstream {LOCAL_MANIFEST}: {e}"));
            ServiceRegistry::new()
        }
    }
}
