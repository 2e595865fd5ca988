//! Plugin manifests
//!
//! Two files are involved. The local `plugin.json` at the plugin root holds
//! the descriptive metadata maintainers edit by hand. The distribution
//! manifest `.claude-plugin/plugin.json` is regenerated on every run from
//! that metadata, the upstream version and the merged service registry.

use crate::journal::SyncJournal;
use crate::registry::ServiceRegistry;
use crate::Result;
use chrono::{DateTime, Local};
use sc_fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

/// Local manifest, relative to the plugin root.
pub const LOCAL_MANIFEST: &str = "plugin.json";

/// Distribution manifest, relative to the plugin root.
pub const DISTRIBUTION_MANIFEST: &str = ".claude-plugin/plugin.json";

/// Secondary upstream version source.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Version used when no manifest names one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Directory for local manifest backups, relative to the plugin root.
pub const BACKUP_DIR: &str = "backups";

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// The local manifest as found at the start of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalManifest {
    Missing,
    /// Present but not a parseable JSON object.
    Unusable,
    Loaded(Map<String, Value>),
}

impl LocalManifest {
    /// Its `mcpServers`, empty unless the manifest was loaded.
    pub fn registry(&self) -> ServiceRegistry {
        match self {
            Self::Loaded(fields) => fields
                .get("mcpServers")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            Self::Missing | Self::Unusable => ServiceRegistry::new(),
        }
    }
}

/// Contents of a plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: Value,
    pub homepage: String,
    pub repository: String,
    pub license: String,
    pub keywords: Vec<String>,
    #[serde(
        rename = "mcpServers",
        default,
        skip_serializing_if = "ServiceRegistry::is_empty"
    )]
    pub mcp_servers: ServiceRegistry,
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist.
pub fn read_json(fs: &dyn FileSystem, path: &Path) -> Result<Option<Value>> {
    if !fs.is_file(path) {
        return Ok(None);
    }
    let text = fs.read_to_string(path)?;
    Ok(Some(serde_json::from_str(&text)?))
}

/// Write `value` as two-space indented JSON with a trailing newline.
pub fn write_json(fs: &dyn FileSystem, path: &Path, value: &impl Serialize) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs.write(path, text.as_bytes())?;
    Ok(())
}

fn version_field(manifest: &Value) -> Option<String> {
    manifest
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The version to publish.
///
/// Taken from the upstream `plugin.json`, then the upstream `package.json`,
/// then the local `plugin.json`, then [`DEFAULT_VERSION`]. Unreadable files
/// are skipped.
pub fn resolve_version(fs: &dyn FileSystem, upstream_root: &Path, plugin_root: &Path) -> String {
    let candidates = [
        upstream_root.join(LOCAL_MANIFEST),
        upstream_root.join(PACKAGE_MANIFEST),
        plugin_root.join(LOCAL_MANIFEST),
    ];

    for path in &candidates {
        match read_json(fs, path) {
            Ok(Some(manifest)) => {
                if let Some(version) = version_field(&manifest) {
                    tracing::debug!("Version {} from {}", version, path.display());
                    return version;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!("Skipping {}: {}", path.display(), e),
        }
    }

    DEFAULT_VERSION.to_string()
}

/// Number of `<prefix>*.md` files directly in `dir`.
pub fn count_prefixed(fs: &dyn FileSystem, dir: &Path, prefix: &str) -> Result<usize> {
    if !fs.is_dir(dir) {
        return Ok(0);
    }
    Ok(fs
        .list_dir(dir)?
        .into_iter()
        .filter(|e| !e.is_dir)
        .map(|e| e.file_name())
        .filter(|name| name.starts_with(prefix) && name.ends_with(".md"))
        .count())
}

/// Builds and writes the manifests of one plugin root.
pub struct ManifestWriter<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
    dry_run: bool,
}

impl<'a> ManifestWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: &'a Path, dry_run: bool) -> Self {
        Self { fs, root, dry_run }
    }

    pub fn local_path(&self) -> PathBuf {
        self.root.join(LOCAL_MANIFEST)
    }

    pub fn distribution_path(&self) -> PathBuf {
        self.root.join(DISTRIBUTION_MANIFEST)
    }

    /// Read the local manifest once for the whole run.
    ///
    /// A file that cannot be parsed, or is not a JSON object, records one
    /// warning and is treated as unusable from then on.
    pub fn read_local(&self, journal: &mut SyncJournal) -> LocalManifest {
        match read_json(self.fs, &self.local_path()) {
            Ok(None) => LocalManifest::Missing,
            Ok(Some(Value::Object(fields))) => LocalManifest::Loaded(fields),
            Ok(Some(_)) => {
                journal.warn(format!(
                    "Failed to read local {}: not a JSON object - using default metadata",
                    LOCAL_MANIFEST
                ));
                LocalManifest::Unusable
            }
            Err(e) => {
                journal.warn(format!(
                    "Failed to read local {}: {} - using default metadata",
                    LOCAL_MANIFEST, e
                ));
                LocalManifest::Unusable
            }
        }
    }

    /// Copy the local manifest to `backups/plugin.json.<timestamp>.backup`.
    ///
    /// Returns the backup path, or `None` when there is no local manifest or
    /// in dry-run.
    pub fn backup_local(&self, at: DateTime<Local>) -> Result<Option<PathBuf>> {
        let source = self.local_path();
        if !self.fs.is_file(&source) {
            return Ok(None);
        }
        let name = format!(
            "{}.{}.backup",
            LOCAL_MANIFEST,
            at.format(BACKUP_TIMESTAMP_FORMAT)
        );
        let target = self.root.join(BACKUP_DIR).join(name);

        if self.dry_run {
            tracing::info!("[dry-run] Would back up {} to {}", source.display(), target.display());
            return Ok(None);
        }
        let contents = self.fs.read(&source)?;
        self.fs.write(&target, &contents)?;
        tracing::info!("Backup created: {}", target.display());
        Ok(Some(target))
    }

    /// Build the distribution manifest for `namespace` at `version`.
    ///
    /// Descriptive fields come from the local manifest when it was loaded,
    /// otherwise from the built-in defaults.
    pub fn generate(&self, namespace: &str, version: &str, local: &LocalManifest) -> PluginManifest {
        let defaults = default_metadata();
        let base = match local {
            LocalManifest::Loaded(fields) => fields,
            LocalManifest::Missing | LocalManifest::Unusable => &defaults,
        };

        let text = |key: &str, fallback: &str| {
            base.get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        PluginManifest {
            name: namespace.to_string(),
            version: version.to_string(),
            description: text("description", ""),
            author: base.get("author").cloned().unwrap_or_else(|| json!({})),
            homepage: text("homepage", ""),
            repository: text("repository", ""),
            license: text("license", "MIT"),
            keywords: base
                .get("keywords")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            mcp_servers: ServiceRegistry::new(),
        }
    }

    /// Write the distribution manifest.
    pub fn write_distribution(&self, manifest: &PluginManifest) -> Result<()> {
        let path = self.distribution_path();
        if self.dry_run {
            tracing::info!("[dry-run] Would write {}", path.display());
            return Ok(());
        }
        write_json(self.fs, &path, manifest)?;
        tracing::info!("Written: {}", path.display());
        Ok(())
    }

    /// Replace `mcpServers` in the local manifest, if it was loaded.
    ///
    /// Every other field of the file is kept as is.
    pub fn store_local_registry(&self, local: &LocalManifest, registry: &ServiceRegistry) -> Result<()> {
        let LocalManifest::Loaded(fields) = local else {
            return Ok(());
        };
        let path = self.local_path();
        let mut fields = fields.clone();
        fields.insert("mcpServers".to_string(), Value::Object(registry.clone()));

        if self.dry_run {
            tracing::info!("[dry-run] Would update {}", path.display());
            return Ok(());
        }
        write_json(self.fs, &path, &fields)
    }
}

fn default_metadata() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("description".into(), json!("SuperClaude Plugin"));
    fields.insert("author".into(), json!({"name": "SuperClaude Team"}));
    fields.insert("license".into(), json!("MIT"));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sc_fs::MemoryFs;

    fn root() -> &'static Path {
        Path::new("/plugin")
    }

    #[test]
    fn version_precedence() {
        let fs = MemoryFs::new();
        let upstream = Path::new("/up");
        assert_eq!(resolve_version(&fs, upstream, root()), "1.0.0");

        fs.insert("/plugin/plugin.json", r#"{"version": "0.9.0"}"#);
        assert_eq!(resolve_version(&fs, upstream, root()), "0.9.0");

        fs.insert("/up/package.json", r#"{"version": "4.1.0"}"#);
        assert_eq!(resolve_version(&fs, upstream, root()), "4.1.0");

        fs.insert("/up/plugin.json", r#"{"version": "4.2.0"}"#);
        assert_eq!(resolve_version(&fs, upstream, root()), "4.2.0");
    }

    #[test]
    fn unreadable_upstream_version_falls_through() {
        let fs = MemoryFs::new();
        fs.insert("/up/plugin.json", "{ broken");
        fs.insert("/up/package.json", r#"{"name": "no-version"}"#);
        fs.insert("/plugin/plugin.json", r#"{"version": "2.0.0"}"#);

        assert_eq!(resolve_version(&fs, Path::new("/up"), root()), "2.0.0");
    }

    fn read_local(fs: &MemoryFs) -> (LocalManifest, SyncJournal) {
        let mut journal = SyncJournal::new();
        let local = ManifestWriter::new(fs, root(), false).read_local(&mut journal);
        (local, journal)
    }

    fn at(text: &str) -> DateTime<Local> {
        let naive = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap();
        naive.and_local_timezone(Local).earliest().unwrap()
    }

    #[test]
    fn generate_uses_local_metadata() {
        let fs = MemoryFs::new();
        fs.insert(
            "/plugin/plugin.json",
            r#"{
  "name": "local-name",
  "description": "Namespaced SuperClaude",
  "author": {"name": "Plugin Team", "email": "team@example.com"},
  "homepage": "https://example.com",
  "keywords": ["claude", "plugin", 7],
  "custom": true
}"#,
        );
        let (local, journal) = read_local(&fs);

        let manifest = ManifestWriter::new(&fs, root(), false).generate("sc", "4.2.0", &local);

        assert_eq!(manifest.name, "sc");
        assert_eq!(manifest.version, "4.2.0");
        assert_eq!(manifest.description, "Namespaced SuperClaude");
        assert_eq!(manifest.author["email"], "team@example.com");
        assert_eq!(manifest.homepage, "https://example.com");
        assert_eq!(manifest.repository, "");
        assert_eq!(manifest.license, "MIT");
        assert_eq!(manifest.keywords, vec!["claude", "plugin"]);
        assert!(journal.is_empty());
    }

    #[test]
    fn generate_without_local_manifest_uses_defaults() {
        let fs = MemoryFs::new();
        let (local, journal) = read_local(&fs);
        assert_eq!(local, LocalManifest::Missing);

        let manifest = ManifestWriter::new(&fs, root(), false).generate("sc", "1.0.0", &local);

        assert_eq!(manifest.description, "SuperClaude Plugin");
        assert_eq!(manifest.author, json!({"name": "SuperClaude Team"}));
        assert!(journal.is_empty());
    }

    #[test]
    fn broken_local_manifest_warns_once() {
        let fs = MemoryFs::new();
        fs.insert("/plugin/plugin.json", "not json");
        let (local, journal) = read_local(&fs);
        let writer = ManifestWriter::new(&fs, root(), false);

        let manifest = writer.generate("sc", "1.0.0", &local);
        writer.store_local_registry(&local, &ServiceRegistry::new()).unwrap();

        assert_eq!(local, LocalManifest::Unusable);
        assert!(local.registry().is_empty());
        assert_eq!(manifest.description, "SuperClaude Plugin");
        assert_eq!(journal.warnings().len(), 1);
        assert!(journal.warnings()[0].starts_with("Failed to read local plugin.json"));
        assert_eq!(fs.read_to_string(&writer.local_path()).unwrap(), "not json");
    }

    #[test]
    fn non_object_local_manifest_is_unusable() {
        let fs = MemoryFs::new();
        fs.insert("/plugin/plugin.json", "[1, 2]");
        let (local, journal) = read_local(&fs);

        assert_eq!(local, LocalManifest::Unusable);
        assert_eq!(journal.warnings().len(), 1);
    }

    #[test]
    fn distribution_manifest_json_shape() {
        let fs = MemoryFs::new();
        let writer = ManifestWriter::new(&fs, root(), false);
        let mut manifest = writer.generate("sc", "1.2.3", &LocalManifest::Missing);

        writer.write_distribution(&manifest).unwrap();
        let written = read_json(&fs, &writer.distribution_path()).unwrap().unwrap();
        assert!(written.get("mcpServers").is_none());
        assert_eq!(written["version"], "1.2.3");

        manifest.mcp_servers = serde_json::from_value(json!({"a": {"command": "x"}})).unwrap();
        writer.write_distribution(&manifest).unwrap();
        let text = fs.read_to_string(&writer.distribution_path()).unwrap();
        assert!(text.ends_with("}\n"));
        let written: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written["mcpServers"], json!({"a": {"command": "x"}}));
    }

    #[test]
    fn local_registry_update_keeps_other_fields() {
        let fs = MemoryFs::new();
        fs.insert(
            "/plugin/plugin.json",
            r#"{"name": "sc", "custom": [1, 2], "mcpServers": {"old": 1}}"#,
        );
        let (local, _) = read_local(&fs);
        assert_eq!(local.registry(), serde_json::from_value::<ServiceRegistry>(json!({"old": 1})).unwrap());
        let writer = ManifestWriter::new(&fs, root(), false);
        let registry = serde_json::from_value(json!({"new": 2})).unwrap();

        writer.store_local_registry(&local, &registry).unwrap();

        let written = read_json(&fs, &writer.local_path()).unwrap().unwrap();
        assert_eq!(written, json!({"name": "sc", "custom": [1, 2], "mcpServers": {"new": 2}}));
    }

    #[test]
    fn local_registry_is_not_created() {
        let fs = MemoryFs::new();
        let writer = ManifestWriter::new(&fs, root(), false);

        writer
            .store_local_registry(&LocalManifest::Missing, &ServiceRegistry::new())
            .unwrap();

        assert!(!fs.exists(&writer.local_path()));
    }

    #[test]
    fn backup_copies_local_manifest() {
        let fs = MemoryFs::new();
        fs.insert("/plugin/plugin.json", r#"{"name": "sc"}"#);
        let writer = ManifestWriter::new(&fs, root(), false);

        let backup = writer.backup_local(at("2026-03-04 05:06:07")).unwrap();

        let expected = PathBuf::from("/plugin/backups/plugin.json.20260304_050607.backup");
        assert_eq!(backup, Some(expected.clone()));
        assert_eq!(fs.read_to_string(&expected).unwrap(), r#"{"name": "sc"}"#);
        assert_eq!(fs.read_to_string(&writer.local_path()).unwrap(), r#"{"name": "sc"}"#);
    }

    #[test]
    fn backup_without_local_manifest_is_skipped() {
        let fs = MemoryFs::new();
        let writer = ManifestWriter::new(&fs, root(), false);

        assert_eq!(writer.backup_local(at("2026-03-04 05:06:07")).unwrap(), None);
        assert!(!fs.exists(Path::new("/plugin/backups")));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let fs = MemoryFs::new();
        fs.insert("/plugin/plugin.json", r#"{"mcpServers": {}}"#);
        let writer = ManifestWriter::new(&fs, root(), true);
        let mut journal = SyncJournal::new();
        let local = writer.read_local(&mut journal);
        let mut manifest = writer.generate("sc", "1.0.0", &local);
        let registry: ServiceRegistry = serde_json::from_value(json!({"a": 1})).unwrap();
        manifest.mcp_servers = registry.clone();

        assert_eq!(writer.backup_local(at("2026-03-04 05:06:07")).unwrap(), None);
        writer.write_distribution(&manifest).unwrap();
        writer.store_local_registry(&local, &registry).unwrap();

        assert_eq!(fs.file_paths(), vec![PathBuf::from("/plugin/plugin.json")]);
        assert_eq!(fs.read_to_string(&writer.local_path()).unwrap(), r#"{"mcpServers": {}}"#);
    }

    #[test]
    fn count_prefixed_ignores_other_files() {
        let fs = MemoryFs::new();
        fs.insert("/plugin/commands/sc-a.md", "");
        fs.insert("/plugin/commands/sc-b.md", "");
        fs.insert("/plugin/commands/local.md", "");
        fs.insert("/plugin/commands/sc-c.txt", "");

        assert_eq!(count_prefixed(&fs, Path::new("/plugin/commands"), "sc-").unwrap(), 2);
        assert_eq!(count_prefixed(&fs, Path::new("/plugin/none"), "sc-").unwrap(), 0);
    }
}
