//! End-to-end tests that invoke the compiled `sc-plugin` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use sc_test_utils::repo::TestTree;
use serde_json::Value;
use tempfile::tempdir;

fn sc_plugin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sc-plugin"));
    cmd.env_remove("SC_SOURCE_REPO")
        .env_remove("SC_PLUGIN_ROOT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn framework() -> TestTree {
    TestTree::framework(
        &[
            ("analyze.md", "# /analyze\n\nFollow up with /improve.\n"),
            ("improve.md", "# /improve\n"),
        ],
        &[(
            "security-engineer.md",
            "---\nname: security-engineer\n---\nAudit.\n",
        )],
    )
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_commands() {
    sc_plugin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("layout"));
}

#[test]
fn test_sync_help_shows_flags() {
    sc_plugin()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--source-repo"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--output-report"));
}

// ============================================================================
// Sync
// ============================================================================

#[test]
fn test_sync_success_writes_report() {
    let upstream = framework();
    let plugin = TestTree::new();
    plugin.write("README.md", "# Plugin\n");
    let report_dir = tempdir().unwrap();
    let report_path = report_dir.path().join("report.json");

    sc_plugin()
        .args(["sync", "--source-repo", upstream.root_str()])
        .args(["--plugin-root", plugin.root_str()])
        .arg("--output-report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("SYNC SUMMARY"))
        .stdout(predicate::str::contains("Commands transformed:    2"));

    plugin.assert_file_contains("commands/sc-analyze.md", "# /sc:analyze");
    plugin.assert_file_contains("commands/sc-analyze.md", "/sc:improve.");
    plugin.assert_file_contains("agents/sc-security-engineer.md", "name: sc-security-engineer");
    plugin.assert_file_exists(".claude-plugin/plugin.json");
    assert_eq!(plugin.read("README.md"), "# Plugin\n");

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["files_synced"], 3);
    assert_eq!(report["commands_transformed"], 2);
    assert_eq!(report["agents_transformed"], 1);
    assert_eq!(report["source_version"], "1.0.0");
    assert_eq!(report["errors"], Value::Array(vec![]));
}

#[test]
fn test_sync_reads_env_vars() {
    let upstream = framework();
    let plugin = TestTree::new();

    sc_plugin()
        .arg("sync")
        .env("SC_SOURCE_REPO", upstream.root_str())
        .env("SC_PLUGIN_ROOT", plugin.root_str())
        .assert()
        .success();

    plugin.assert_file_exists("commands/sc-improve.md");
}

#[test]
fn test_sync_defaults_to_current_dir() {
    let upstream = framework();
    let plugin = TestTree::new();

    sc_plugin()
        .args(["sync", "--source-repo", upstream.root_str()])
        .current_dir(plugin.root())
        .assert()
        .success();

    plugin.assert_file_exists("commands/sc-analyze.md");
}

#[test]
fn test_sync_dry_run_writes_nothing() {
    let upstream = framework();
    let plugin = TestTree::new();

    sc_plugin()
        .args(["sync", "--dry-run", "--source-repo", upstream.root_str()])
        .args(["--plugin-root", plugin.root_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    plugin.assert_file_not_exists("commands");
    plugin.assert_file_not_exists("agents");
    plugin.assert_file_not_exists(".claude-plugin");
}

#[test]
fn test_sync_failure_exits_one_and_reports() {
    let plugin = TestTree::new();
    let missing = plugin.root().join("missing-framework");
    let report_path = plugin.root().join("sync-report.json");

    sc_plugin()
        .args(["sync", "--source-repo", missing.to_str().unwrap()])
        .args(["--plugin-root", plugin.root_str()])
        .arg("--output-report")
        .arg(&report_path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILED"));

    let report: Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["success"], false);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
}

#[test]
fn test_sync_missing_plugin_root_is_an_error() {
    let temp = tempdir().unwrap();

    sc_plugin()
        .args(["sync", "--plugin-root"])
        .arg(temp.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Plugin root not found"));
}

#[test]
fn test_sync_rejects_bad_dry_run_value() {
    sc_plugin()
        .args(["sync", "--dry-run", "perhaps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected true/false"));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_layout_default_is_valid() {
    sc_plugin()
        .arg("layout")
        .assert()
        .success()
        .stdout(predicate::str::contains("src/superclaude/commands -> commands"))
        .stdout(predicate::str::contains(".claude-plugin/"))
        .stdout(predicate::str::contains("Layout is valid"));
}

#[test]
fn test_layout_overlap_exits_one() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("sync.toml");
    std::fs::write(
        &config,
        r#"
[[mappings]]
source = "src/superclaude/modes"
destination = "modes"
kind = "assets"
mode = "mirror"
"#,
    )
    .unwrap();

    sc_plugin()
        .args(["layout", "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("overlaps protected path"));
}

#[test]
fn test_sync_with_overlapping_config_refuses_to_run() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("sync.json");
    std::fs::write(
        &config,
        r#"{"mappings": [{"source": "docs", "destination": "docs", "kind": "assets", "mode": "mirror"}]}"#,
    )
    .unwrap();
    let plugin = TestTree::new();

    sc_plugin()
        .args(["sync", "--plugin-root", plugin.root_str(), "--config"])
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("overlaps protected path"));

    plugin.assert_file_not_exists(".claude-plugin");
}
