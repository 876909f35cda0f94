/// Integration test suite: every test builds a small TypeScript project in a temp
/// directory and drives the compiled `code-topology` binary against it.
///
/// `CARGO_BIN_EXE_code-topology` is set by Cargo during `cargo test` and points to the
/// binary for the current profile.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_code-topology"))
}

/// Run a code-topology command and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(args: &[&str]) -> String {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke code-topology binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    stdout
}

/// Run a code-topology command and assert it exits with a non-zero status.
/// Returns (stdout, stderr) as Strings.
fn run_failure(args: &[&str]) -> (String, String) {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke code-topology binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        !out.status.success(),
        "command {:?} expected to fail but exited successfully\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    (stdout, stderr)
}

fn write_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for (rel, content) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture file");
    }
    dir
}

/// A small Next.js-style app: two routes, one UI component, two lib modules and an
/// unused file.
fn next_app() -> TempDir {
    write_project(&[
        (
            "app/page.tsx",
            "import { Button } from '../components/ui/Button';\nimport { fetchData } from '../lib/api';\n",
        ),
        (
            "app/(auth)/login/page.tsx",
            "import { Button } from '../../../components/ui/Button';\n",
        ),
        (
            "components/ui/Button.tsx",
            "import { cn } from '../../lib/cn';\nexport function Button() {}\n",
        ),
        ("lib/api.ts", "import { cn } from './cn';\nexport const fetchData = 1;\n"),
        ("lib/cn.ts", "export const cn = () => '';\n"),
        ("lib/unused.ts", "export const nothing = 0;\n"),
    ])
}

fn cyclic_project() -> TempDir {
    write_project(&[
        ("a.ts", "import './b';\n"),
        ("b.ts", "import { a } from './a';\n"),
    ])
}

fn path_arg(dir: &Path) -> String {
    dir.to_string_lossy().to_string()
}

fn parse_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}):\n{stdout}"))
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn test_analyze_summary() {
    let project = next_app();
    let stdout = run_success(&["analyze", &path_arg(project.path())]);
    assert!(stdout.contains("Analyzed 6 files"), "stdout: {stdout}");
    assert!(stdout.contains("5 dependency edges (5 distinct links)"), "stdout: {stdout}");
    assert!(
        stdout.contains("0 cycles, 1 orphaned files, 2 entry points"),
        "stdout: {stdout}"
    );
}

#[test]
fn test_analyze_json_output() {
    let project = next_app();
    let stdout = run_success(&["analyze", &path_arg(project.path()), "--json"]);
    let value = parse_json(&stdout);
    assert_eq!(value["file_count"], 6);
    assert_eq!(value["edge_count"], 5);
    assert_eq!(value["orphan_count"], 1);
    assert_eq!(value["entry_point_count"], 2);
    assert_eq!(value["resolution"]["unresolved"], 0);
}

#[test]
fn test_analyze_respects_config_excludes() {
    let project = next_app();
    fs::write(
        project.path().join("code-topology.toml"),
        "exclude = [\"**/unused.ts\", \"**/*.toml\"]\n",
    )
    .unwrap();
    let stdout = run_success(&["analyze", &path_arg(project.path()), "--json"]);
    let value = parse_json(&stdout);
    assert_eq!(value["file_count"], 5);
    assert_eq!(value["orphan_count"], 0);
}

#[test]
fn test_analyze_missing_path_fails() {
    let (_stdout, stderr) = run_failure(&["analyze", "/definitely/not/a/real/project"]);
    assert!(
        stderr.contains("cannot access project root"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_invalid_entry_pattern_fails() {
    let project = next_app();
    fs::write(
        project.path().join("code-topology.toml"),
        "[classify]\nentry_patterns = [\"(\"]\n",
    )
    .unwrap();
    let (_stdout, stderr) = run_failure(&["analyze", &path_arg(project.path())]);
    assert!(stderr.contains("invalid entry pattern"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// cycles
// ---------------------------------------------------------------------------

#[test]
fn test_cycles_reports_two_file_cycle() {
    let project = cyclic_project();
    let stdout = run_success(&["cycles", &path_arg(project.path())]);
    assert!(stdout.contains("Found 1 circular dependencies"), "stdout: {stdout}");
    assert!(stdout.contains("a.ts -> b.ts -> a.ts"), "stdout: {stdout}");
}

#[test]
fn test_cycles_json_output() {
    let project = cyclic_project();
    let stdout = run_success(&["cycles", &path_arg(project.path()), "--json"]);
    let value = parse_json(&stdout);
    let reports = value.as_array().expect("array of cycle reports");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["severity"], "high");
    assert_eq!(reports[0]["paths"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cycles_none_found() {
    let project = next_app();
    let stdout = run_success(&["cycles", &path_arg(project.path())]);
    assert_eq!(stdout, "No circular dependencies found.\n");
}

// ---------------------------------------------------------------------------
// topology
// ---------------------------------------------------------------------------

#[test]
fn test_topology_summary() {
    let project = next_app();
    let stdout = run_success(&["topology", &path_arg(project.path())]);
    assert!(
        stdout.contains("force-directed layout, hybrid clustering"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("6 nodes, 5 edges"), "stdout: {stdout}");
    assert!(stdout.contains("Clusters:"), "stdout: {stdout}");
}

#[test]
fn test_topology_json_every_layout() {
    let project = next_app();
    for layout in ["force-directed", "hierarchical", "circular", "grid"] {
        let stdout = run_success(&[
            "topology",
            &path_arg(project.path()),
            "--layout",
            layout,
            "--json",
        ]);
        let value = parse_json(&stdout);
        assert_eq!(value["layout"]["algorithm"], layout);

        let nodes = value["nodes"].as_array().expect("nodes array");
        assert_eq!(nodes.len(), 6);
        for node in nodes {
            assert!(node["position"]["x"].as_f64().is_some_and(f64::is_finite));
            assert!(node["position"]["y"].as_f64().is_some_and(f64::is_finite));
        }
        assert_eq!(value["edges"].as_array().unwrap().len(), 5);
    }
}

#[test]
fn test_topology_feature_clustering_groups_routes_and_components() {
    let project = next_app();
    let stdout = run_success(&[
        "topology",
        &path_arg(project.path()),
        "--clustering",
        "feature-based",
        "--json",
    ]);
    let value = parse_json(&stdout);
    let ids: Vec<&str> = value["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_str())
        .collect();
    assert!(ids.contains(&"route-group-auth"), "clusters: {ids:?}");
    assert!(ids.contains(&"component-ui"), "clusters: {ids:?}");
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn test_export_dot_to_file() {
    let project = next_app();
    let out_dir = TempDir::new().unwrap();
    let out_file = out_dir.path().join("topology.dot");
    let stdout = run_success(&[
        "export",
        &path_arg(project.path()),
        "--format",
        "dot",
        "-o",
        &path_arg(&out_file),
    ]);
    assert!(stdout.is_empty(), "stdout should be empty with -o: {stdout}");

    let dot = fs::read_to_string(&out_file).unwrap();
    assert!(dot.starts_with("digraph topology {"));
    assert!(dot.contains("subgraph cluster_"));
    assert!(dot.contains(" -> "));
}

#[test]
fn test_export_json_to_stdout() {
    let project = next_app();
    let stdout = run_success(&["export", &path_arg(project.path()), "--layout", "grid"]);
    let value = parse_json(&stdout);
    assert_eq!(value["layout"]["algorithm"], "grid");
    assert_eq!(value["nodes"].as_array().unwrap().len(), 6);
    assert!(value["metrics"]["density"].as_f64().is_some());
}
