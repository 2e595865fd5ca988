//! Framework to Plugin content sync for SuperClaude
//!
//! Pulls commands and agents from the upstream Framework repository, rewrites
//! them into the `sc` namespace and lays them out in the plugin tree, while
//! guaranteeing that plugin-owned files are never altered.
//!
//! - **ContentTransformer**: pure text rewriting of command references and agent names
//! - **FileSyncer**: directory sync with filename prefix, renames and stale removal
//! - **ProtectionGuard**: checksum snapshot and validation of protected paths
//! - **Registry merge**: upstream-wins merge of the `mcpServers` service registry
//! - **SyncOrchestrator**: the run state machine producing a [`SyncReport`]
//!
//! # Architecture
//!
//! ```text
//!                   sc-cli
//!                     |
//!                  sc-sync
//!                     |
//!              +------+------+
//!              |             |
//!            sc-fs         sc-git
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sc_sync::{SyncOptions, SyncOrchestrator, SyncPlan};
//!
//! let plan = SyncPlan::default();
//! let mut orchestrator = SyncOrchestrator::for_plugin_root(plan, ".", SyncOptions::default());
//! let report = orchestrator.run();
//! assert!(report.success);
//! ```

pub mod error;
pub mod journal;
pub mod manifest;
pub mod orchestrator;
pub mod plan;
pub mod protection;
pub mod registry;
pub mod report;
pub mod source;
pub mod syncer;
pub mod transform;
pub mod vcs;

pub use error::{Error, Result};
pub use journal::SyncJournal;
pub use manifest::{
    BACKUP_DIR, DISTRIBUTION_MANIFEST, LOCAL_MANIFEST, LocalManifest, ManifestWriter, PluginManifest,
};
pub use orchestrator::{SyncOptions, SyncOrchestrator, SyncState};
pub use plan::{
    ContentKind, DEFAULT_PROTECTED, DEFAULT_SOURCE_REPO, MappingMode, SyncConfig, SyncMapping,
    SyncPlan,
};
pub use protection::{ProtectionGuard, ProtectionSnapshot, ProtectionViolation, Violation, ViolationKind};
pub use registry::{RegistryMerge, ServiceRegistry, merge_registries};
pub use report::SyncReport;
pub use source::{AcquiredSource, GitSource, SourceProvider};
pub use syncer::{FileSyncer, SyncStats};
pub use transform::{ContentTransformer, DEFAULT_NAMESPACE, Transform};
pub use vcs::{GitHistory, HistoryRename};
