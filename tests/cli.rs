//! End-to-end tests for the `floorgraph` binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use floorgraph_ir::{NodeId, load_project};
use predicates::prelude::*;
use tempfile::TempDir;

fn floorgraph() -> Command {
    let mut cmd = Command::cargo_bin("floorgraph").unwrap();
    cmd.env_remove("FLOORGRAPH_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn run(args: &[&str]) {
    floorgraph().args(args).assert().success();
}

/// Two floors, a room and a hallway on the ground floor, stairs on both
fn campus(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("campus.json");
    let p = path.to_str().unwrap();

    run(&["new", p, "--name", "Campus"]);
    run(&["floor", "add", p, "Ground", "--id", "g", "--level", "0", "--width", "800", "--height", "600"]);
    run(&["floor", "add", p, "First", "--id", "f1", "--level", "1"]);
    run(&["node", "add", p, "-f", "g", "-x", "10", "-y", "10", "--id", "lobby", "-n", "Lobby"]);
    run(&["node", "add", p, "-f", "g", "-x", "10", "-y", "20", "--id", "hall", "-t", "hallway"]);
    run(&["node", "add", p, "-f", "Ground", "-x", "90", "-y", "90", "--id", "s0", "-t", "stair"]);
    run(&["node", "add", p, "-f", "First", "-x", "90", "-y", "90", "--id", "s1", "-t", "stair"]);
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_build_project_from_scratch() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    let p = path_str(&path);

    floorgraph()
        .args(["link", p, "lobby", "hall"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance 10"));
    floorgraph()
        .args(["link", p, "s0", "s1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("by stair"));

    let project = load_project(&path).unwrap();
    assert_eq!(project.floor_count(), 2);
    assert_eq!(project.node_count(), 4);
    assert_eq!(project.neighbors(&NodeId::new("hall")).len(), 1);
    assert_eq!(project.connections().len(), 1);

    floorgraph()
        .args(["validate", p])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓"));
}

#[test]
fn test_new_appends_extension() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("plain");
    run(&["new", path_str(&base)]);
    assert!(temp.path().join("plain.json").exists());

    floorgraph()
        .args(["new", path_str(&base)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_info_json() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);

    let output = floorgraph()
        .args(["info", path_str(&path), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["floor_count"], 2);
    assert_eq!(stats["node_count"], 4);
}

#[test]
fn test_info_lists_floors() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    floorgraph()
        .args(["info", path_str(&path)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Campus"))
        .stdout(predicate::str::contains("Ground"))
        .stdout(predicate::str::contains("800x600"));
}

#[test]
fn test_link_rejects_rooms_across_floors() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    floorgraph()
        .args(["link", path_str(&path), "lobby", "s1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stair or elevator"));
}

#[test]
fn test_validate_reports_and_fixes() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    let p = path_str(&path);
    run(&["link", p, "lobby", "hall"]);

    // Drop the reverse half of the edge
    let mut doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["floors"][0]["nodes"][1]["connections"] = serde_json::json!([]);
    std::fs::write(&path, doc.to_string()).unwrap();

    floorgraph()
        .args(["validate", path_str(temp.path())])
        .assert()
        .failure()
        .stdout(predicate::str::contains("error:"));
    floorgraph().args(["validate", p, "--fix"]).assert().success();
    floorgraph().args(["validate", p]).assert().success();
}

#[test]
fn test_validate_malformed_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{\"building\": ").unwrap();
    floorgraph()
        .args(["validate", path_str(&path)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed validation"));
}

#[test]
fn test_export_compact_to_stdout() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    let output = floorgraph()
        .args(["export", path_str(&path), "--compact", "--strip-images"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.trim_end().lines().count(), 1);
    assert!(text.contains("\"building\""));
}

#[test]
fn test_remove_floor_cascades() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    let p = path_str(&path);
    run(&["link", p, "s0", "s1"]);
    run(&["floor", "remove", p, "f1"]);

    let project = load_project(&path).unwrap();
    assert_eq!(project.floor_count(), 1);
    assert!(project.connections().is_empty());
}

#[test]
fn test_bad_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = campus(&temp);
    let config = temp.path().join("editor.toml");
    std::fs::write(&config, "history_capacity = 0\n").unwrap();

    floorgraph()
        .args(["info", path_str(&path), "--config", path_str(&config)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration"));
}
