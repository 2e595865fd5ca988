//! Multi-run sync scenarios against real git repositories
//!
//! Each test builds a Framework repository with `TestTree::framework`, lets
//! it evolve through commits, and syncs it into a plugin root on disk.

use pretty_assertions::assert_eq;
use sc_fs::{Checksum, FileSystem, NormalizedPath, RealFs, walk_files};
use sc_sync::{SyncOptions, SyncOrchestrator, SyncPlan, SyncReport, SyncState};
use sc_test_utils::repo::TestTree;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;

fn sync(framework: &TestTree, plugin: &TestTree) -> (SyncReport, Vec<SyncState>) {
    let plan = SyncPlan::default().with_source_repo(framework.root_str());
    let mut orchestrator =
        SyncOrchestrator::for_plugin_root(plan, plugin.root(), SyncOptions::default());
    let report = orchestrator.run();
    (report, orchestrator.history().to_vec())
}

fn digests_under(root: &Path, dirs: &[&str]) -> BTreeMap<NormalizedPath, Checksum> {
    let mut digests = BTreeMap::new();
    for dir in dirs {
        for file in walk_files(&RealFs, &root.join(dir)).unwrap() {
            let key = NormalizedPath::relative_to(&file, root).unwrap();
            digests.insert(key, Checksum::of_bytes(&RealFs.read(&file).unwrap()));
        }
    }
    digests
}

#[test]
fn upstream_changes_flow_through_successive_runs() {
    let framework = TestTree::framework(
        &[("analyze.md", "# /analyze v1\n"), ("build.md", "# /build\n")],
        &[],
    );
    let plugin = TestTree::new();
    plugin.write("commands/custom.md", "plugin-local command\n");

    let (first, _) = sync(&framework, &plugin);
    assert!(first.success, "{:?}", first.errors);
    assert_eq!(first.files_synced, 2);
    assert_eq!(first.files_modified, 0);

    framework.write("src/superclaude/commands/analyze.md", "# /analyze v2\n");
    framework.write("src/superclaude/commands/cleanup.md", "# /cleanup\n");
    std::fs::remove_file(framework.root().join("src/superclaude/commands/build.md")).unwrap();
    framework.commit("Evolve commands");

    let (second, _) = sync(&framework, &plugin);
    assert!(second.success, "{:?}", second.errors);
    assert_eq!(second.files_synced, 1);
    assert_eq!(second.files_modified, 1);
    assert_eq!(second.commands_transformed, 2);

    assert_eq!(plugin.read("commands/sc-analyze.md"), "# /sc:analyze v2\n");
    plugin.assert_file_exists("commands/sc-cleanup.md");
    plugin.assert_file_not_exists("commands/sc-build.md");
    assert_eq!(plugin.read("commands/custom.md"), "plugin-local command\n");
}

#[test]
fn legacy_unprefixed_files_are_moved_in_the_index() {
    let framework = TestTree::framework(&[("analyze.md", "# /analyze\n")], &[]);
    let plugin = TestTree::new();
    let repo = plugin.init_git();
    plugin.write("commands/analyze.md", "# /analyze (old layout)\n");
    plugin.commit("Old layout");

    let (report, _) = sync(&framework, &plugin);

    assert!(report.success, "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.files_modified, 1);
    plugin.assert_file_not_exists("commands/analyze.md");
    assert_eq!(plugin.read("commands/sc-analyze.md"), "# /sc:analyze\n");

    let index = repo.index().unwrap();
    assert!(index.get_path(Path::new("commands/sc-analyze.md"), 0).is_some());
    assert!(index.get_path(Path::new("commands/analyze.md"), 0).is_none());
}

#[test]
fn plugin_owned_paths_are_never_touched() {
    let framework = TestTree::framework(
        &[("load.md", "# /load\n")],
        &[("pm-agent.md", "---\nname: pm-agent\n---\n")],
    );
    framework.write("src/superclaude/modes/MODE_Token.md", "framework mode\n");
    framework.write("src/superclaude/core/RULES.md", "framework rules\n");
    framework.write("README.md", "framework readme\n");
    framework.commit("Add modes and core");

    let plugin = TestTree::new();
    plugin.write("README.md", "# Plugin\n");
    plugin.write("CLAUDE.md", "plugin instructions\n");
    plugin.write("modes/MODE_Token.md", "plugin mode\n");
    plugin.write("core/RULES.md", "plugin rules\n");
    plugin.write("docs/guide.md", "guide\n");
    plugin.write(".github/workflows/sync.yml", "on: schedule\n");
    let owned_dirs = ["modes", "core", "docs", ".github"];
    let before = digests_under(plugin.root(), &owned_dirs);
    let readme = plugin.read("README.md");

    let (report, history) = sync(&framework, &plugin);

    assert!(report.success, "{:?}", report.errors);
    assert!(history.contains(&SyncState::ProtectionValidated));
    assert_eq!(digests_under(plugin.root(), &owned_dirs), before);
    assert_eq!(plugin.read("README.md"), readme);
    assert_eq!(plugin.read("CLAUDE.md"), "plugin instructions\n");
    plugin.assert_file_exists("commands/sc-load.md");
    plugin.assert_file_contains("agents/sc-pm-agent.md", "name: sc-pm-agent");
}

#[test]
fn service_registry_merge_end_to_end() {
    let framework = TestTree::framework(&[("git.md", "# /git\n")], &[]);
    framework.write(
        "plugin.json",
        r#"{"version": "4.1.5", "mcpServers": {"A": {"v": 1}, "B": {"v": 2}}}"#,
    );
    framework.commit("Add manifest");

    let plugin = TestTree::new();
    plugin.write(
        "plugin.json",
        r#"{
  "name": "sc",
  "version": "4.0.0",
  "description": "SuperClaude namespaced plugin",
  "author": {"name": "Plugin Maintainers"},
  "keywords": ["superclaude"],
  "mcpServers": {"B": {"v": 9}, "C": {"v": 3}}
}"#,
    );

    let (report, _) = sync(&framework, &plugin);

    assert!(report.success, "{:?}", report.errors);
    assert_eq!(report.source_version, "4.1.5");
    assert_eq!(report.registry_entries_merged, 3);
    assert_eq!(
        report.warnings,
        vec![
            "Service registry entry 'B' conflict - using upstream version",
            "Preserved local-only service registry entry: C",
        ]
    );

    let merged = json!({"A": {"v": 1}, "B": {"v": 2}, "C": {"v": 3}});
    let local: Value = serde_json::from_str(&plugin.read("plugin.json")).unwrap();
    assert_eq!(local["mcpServers"], merged);
    assert_eq!(local["version"], "4.0.0");

    let distribution: Value =
        serde_json::from_str(&plugin.read(".claude-plugin/plugin.json")).unwrap();
    assert_eq!(
        distribution,
        json!({
            "name": "sc",
            "version": "4.1.5",
            "description": "SuperClaude namespaced plugin",
            "author": {"name": "Plugin Maintainers"},
            "homepage": "",
            "repository": "",
            "license": "MIT",
            "keywords": ["superclaude"],
            "mcpServers": merged,
        })
    );
}

#[test]
fn report_file_matches_returned_report() {
    let framework = TestTree::framework(&[("test.md", "Run /test now\n")], &[]);
    let plugin = TestTree::new();
    let (report, _) = sync(&framework, &plugin);
    let path = plugin.root().join("reports/sync.json");

    report.write_to(&path).unwrap();

    let loaded: SyncReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, report);
    assert_eq!(loaded.source_commit.len(), 40);
}
