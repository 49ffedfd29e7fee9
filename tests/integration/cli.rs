//! Tests driving the `sweepgen` binary

use super::test_utils::TestWorkspace;
use serde_json::{json, Value};
use std::fs;
use std::process::{Command, Output};

fn sweepgen(ws: &TestWorkspace, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sweepgen"))
        .arg("--quiet")
        .arg("--workspace")
        .arg(ws.root())
        .args(args)
        .env("XDG_CONFIG_HOME", ws.root().join("xdg"))
        .env_remove("SWEEPGEN_ENV")
        .output()
        .unwrap()
}

fn lr_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_base("base", &json!({"model": {"lr": 0.1}}));
    ws.write_manifest(&json!({
        "base": {"cfg": "--release", "single": {"lr": ["model.lr", "rng(3,0.1,0.1)"]}}
    }));
    ws
}

#[test]
fn test_bare_invocation_generates() {
    let ws = lr_workspace();
    let output = sweepgen(&ws, &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("base.lr"));
    assert!(stdout.contains("[0.1,0.2,0.3]"));
    assert!(stdout.contains("Generated 3 configurations"));
    assert!(stdout.contains("./base_lr.sh"));
    assert_eq!(ws.generated_configs().len(), 3);
}

#[test]
fn test_status_json_reports_pending_sweeps() {
    let ws = lr_workspace();
    let output = sweepgen(&ws, &["status", "--format", "json"]);
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["generated"], json!(3));
    assert_eq!(report["written"], json!(false));
    assert_eq!(report["sweeps"][0]["status"], json!("regenerated"));
    assert!(!ws.output().exists());
}

#[test]
fn test_force_flag() {
    let ws = lr_workspace();
    assert!(sweepgen(&ws, &["generate"]).status.success());

    let output = sweepgen(&ws, &["generate"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Generated 0 configurations"));

    let output = sweepgen(&ws, &["generate", "--force"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Generated 3 configurations"));
}

#[test]
fn test_missing_base_config_exits_nonzero() {
    let ws = TestWorkspace::new();
    ws.write_manifest(&json!({"ghost": {"single": {"x": ["x", "list(1)"]}}}));

    let output = sweepgen(&ws, &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ghost"));
}

#[test]
fn test_workspace_config_file_is_honored() {
    let ws = lr_workspace();
    fs::create_dir_all(ws.root().join("config")).unwrap();
    fs::write(
        ws.root().join("config").join("config.toml"),
        "output_dir = \"runs\"\n\n[runner]\ncommand = \"./sim\"\n",
    )
    .unwrap();

    let output = sweepgen(&ws, &[]);
    assert!(output.status.success());
    let local = fs::read_to_string(ws.root().join("runs").join("base_lr.sh")).unwrap();
    assert!(local.contains("./sim base_lr_00_0.1.json --release\n"));
}

#[test]
fn test_logs_go_to_requested_stream() {
    let ws = lr_workspace();
    let output = Command::new(env!("CARGO_BIN_EXE_sweepgen"))
        .arg("--workspace")
        .arg(ws.root())
        .args(["--log-output", "stderr", "--log-format", "json"])
        .env("XDG_CONFIG_HOME", ws.root().join("xdg"))
        .env_remove("SWEEPGEN_LOG")
        .env_remove("SWEEPGEN_LOG_FORMAT")
        .env_remove("SWEEPGEN_LOG_OUTPUT")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Creating base configs"));
    assert!(stderr.lines().all(|l| l.trim_start().starts_with('{')));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Creating base configs"));
    assert!(stdout.contains("Generated 3 configurations"));
}
