//! Sync layout: what is copied where, and what must never change
//!
//! [`SyncConfig`] is the serializable form, loadable from TOML or JSON.
//! [`SyncPlan`] is a config that passed validation; the orchestrator only
//! accepts plans.

use crate::transform::{ContentTransformer, DEFAULT_NAMESPACE, Transform};
use crate::{Error, Result};
use sc_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upstream repository used when neither the CLI nor a config names one.
pub const DEFAULT_SOURCE_REPO: &str = "https://github.com/SuperClaude-Org/SuperClaude_Framework";

/// Plugin-owned paths the sync must leave untouched.
pub const DEFAULT_PROTECTED: &[&str] = &[
    "README.md",
    "README-ja.md",
    "README-zh.md",
    "BACKUP_GUIDE.md",
    "MIGRATION_GUIDE.md",
    "SECURITY.md",
    "CLAUDE.md",
    "LICENSE",
    ".gitignore",
    ".claude-plugin/",
    ".github/",
    "docs/",
    "scripts/",
    "tests/",
    "backups/",
    "core/",
    "modes/",
];

/// Which report counter a mapping feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Commands,
    Agents,
    Assets,
}

/// How files of a mapping are carried over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MappingMode {
    /// Top-level `*.md` files, renamed with a prefix and rewritten.
    Namespaced {
        filename_prefix: String,
        transform: Transform,
    },
    /// Recursive byte-for-byte copy.
    Mirror,
}

/// One source directory and where it lands in the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMapping {
    /// Relative to the upstream root
    pub source: String,
    /// Relative to the plugin root
    pub destination: String,
    pub kind: ContentKind,
    #[serde(flatten)]
    pub mode: MappingMode,
}

impl SyncMapping {
    pub fn namespaced(
        source: &str,
        destination: &str,
        kind: ContentKind,
        filename_prefix: &str,
        transform: Transform,
    ) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            kind,
            mode: MappingMode::Namespaced {
                filename_prefix: filename_prefix.to_string(),
                transform,
            },
        }
    }

    pub fn mirror(source: &str, destination: &str, kind: ContentKind) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            kind,
            mode: MappingMode::Mirror,
        }
    }

    pub fn source_path(&self) -> NormalizedPath {
        NormalizedPath::new(&self.source)
    }

    pub fn destination_path(&self) -> NormalizedPath {
        NormalizedPath::new(&self.destination)
    }

    /// Filename prefix for namespaced mappings.
    pub fn filename_prefix(&self) -> Option<&str> {
        match &self.mode {
            MappingMode::Namespaced {
                filename_prefix, ..
            } => Some(filename_prefix),
            MappingMode::Mirror => None,
        }
    }
}

/// The commands and agents tables for `namespace`.
pub fn default_mappings(namespace: &str) -> Vec<SyncMapping> {
    let prefix = ContentTransformer::new(namespace).agent_prefix();
    vec![
        SyncMapping::namespaced(
            "src/superclaude/commands",
            "commands",
            ContentKind::Commands,
            &prefix,
            Transform::Command,
        ),
        SyncMapping::namespaced(
            "src/superclaude/agents",
            "agents",
            ContentKind::Agents,
            &prefix,
            Transform::Agent,
        ),
    ]
}

/// Sync configuration as written in a config file.
///
/// Every field is optional; omitted ones take the built-in defaults. When
/// `mappings` is omitted the default mappings are built for the configured
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SyncConfigFile")]
pub struct SyncConfig {
    pub namespace: String,
    pub source_repo: String,
    pub mappings: Vec<SyncMapping>,
    pub protected: Vec<String>,
}

/// On-disk shape of [`SyncConfig`], before defaults are filled in.
#[derive(Deserialize)]
struct SyncConfigFile {
    #[serde(default = "default_namespace")]
    namespace: String,
    #[serde(default = "default_source_repo")]
    source_repo: String,
    #[serde(default)]
    mappings: Option<Vec<SyncMapping>>,
    #[serde(default = "default_protected")]
    protected: Vec<String>,
}

impl From<SyncConfigFile> for SyncConfig {
    fn from(file: SyncConfigFile) -> Self {
        let mappings = file
            .mappings
            .unwrap_or_else(|| default_mappings(&file.namespace));
        Self {
            namespace: file.namespace,
            source_repo: file.source_repo,
            mappings,
            protected: file.protected,
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_source_repo() -> String {
    DEFAULT_SOURCE_REPO.to_string()
}

fn default_protected() -> Vec<String> {
    DEFAULT_PROTECTED.iter().map(|p| p.to_string()).collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            source_repo: default_source_repo(),
            mappings: default_mappings(DEFAULT_NAMESPACE),
            protected: default_protected(),
        }
    }
}

impl SyncConfig {
    /// Load a `.toml` or `.json` config file.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ConfigStore::new().load(path)?;
        tracing::debug!("Loaded sync config from {}", path.display());
        Ok(config)
    }
}

/// A validated sync layout.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    transformer: ContentTransformer,
    source_repo: String,
    mappings: Vec<SyncMapping>,
    protected: Vec<NormalizedPath>,
}

impl SyncPlan {
    /// Validate `config` and build a plan from it.
    pub fn new(config: SyncConfig) -> Result<Self> {
        Self::validate(&config)?;
        Ok(Self {
            transformer: ContentTransformer::new(config.namespace),
            source_repo: config.source_repo,
            mappings: config.mappings,
            protected: config.protected.iter().map(NormalizedPath::new).collect(),
        })
    }

    /// Check that `config` is usable.
    ///
    /// The namespace must be a non-empty word, every path must be relative
    /// and stay inside its root, and no mapping destination may equal,
    /// contain or lie within a protected path.
    pub fn validate(config: &SyncConfig) -> Result<()> {
        if config.namespace.is_empty()
            || !config
                .namespace
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(Error::InvalidConfig {
                message: format!("namespace '{}' must be a single word", config.namespace),
            });
        }

        for mapping in &config.mappings {
            check_relative(&mapping.source)?;
            check_relative(&mapping.destination)?;
        }
        for protected in &config.protected {
            check_relative(protected)?;
        }

        for mapping in &config.mappings {
            let destination = mapping.destination_path();
            for protected in &config.protected {
                if destination.overlaps(&NormalizedPath::new(protected)) {
                    return Err(Error::LayoutConflict {
                        destination: mapping.destination.clone(),
                        protected: protected.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn transformer(&self) -> &ContentTransformer {
        &self.transformer
    }

    pub fn source_repo(&self) -> &str {
        &self.source_repo
    }

    /// Replace the upstream repository, e.g. from a CLI flag.
    pub fn with_source_repo(mut self, source_repo: impl Into<String>) -> Self {
        self.source_repo = source_repo.into();
        self
    }

    pub fn mappings(&self) -> &[SyncMapping] {
        &self.mappings
    }

    pub fn protected(&self) -> &[NormalizedPath] {
        &self.protected
    }
}

impl Default for SyncPlan {
    fn default() -> Self {
        let config = SyncConfig::default();
        Self {
            transformer: ContentTransformer::new(config.namespace),
            source_repo: config.source_repo,
            mappings: config.mappings,
            protected: config.protected.iter().map(NormalizedPath::new).collect(),
        }
    }
}

fn check_relative(path: &str) -> Result<()> {
    let normalized = NormalizedPath::new(path);
    let escapes = normalized.as_str().split('/').any(|s| s == "..");
    if normalized.as_str().is_empty()
        || normalized.as_str() == "."
        || normalized.as_str().starts_with('/')
        || Path::new(path).is_absolute()
        || escapes
    {
        return Err(Error::InvalidConfig {
            message: format!("'{path}' must be a relative path inside its root"),
        });
    }
    Ok(())
}
