//! Incremental regeneration across runs

use super::test_utils::TestWorkspace;
use serde_json::json;
use std::fs;
use sweepgen::planner::SweepStatus;
use sweepgen::tracker::FingerprintStore;

fn two_sweep_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_base("net", &json!({"model": {"lr": 0.1, "depth": 3}}));
    ws.write_manifest(&json!({
        "net": {"single": {
            "depth": ["model.depth", "list(2, 4)"],
            "lr": ["model.lr", "rng(2,0.1,0.1)"]
        }}
    }));
    ws
}

#[test]
fn test_second_run_is_idempotent() {
    let ws = two_sweep_workspace();
    let first = ws.generate();
    let first_all = ws.read_output("runall.sh");
    let first_store = ws.read_output("hashes.hash");
    assert_eq!(first.generated, 4);

    let second = ws.generate();
    assert_eq!(second.generated, 0);
    assert!(second.sweeps.iter().all(|s| s.status == SweepStatus::Skipped));
    assert_eq!(ws.read_output("runchanged.sh"), "#!/bin/bash\ncd exps\ncd ..\n");
    assert_eq!(ws.read_output("runall.sh"), first_all);
    assert_eq!(ws.read_output("hashes.hash"), first_store);
}

#[test]
fn test_skipped_sweep_configs_are_cleared_but_listed() {
    let ws = two_sweep_workspace();
    ws.generate();
    assert_eq!(ws.generated_configs().len(), 4);

    ws.generate();
    assert!(ws.generated_configs().is_empty());
    // Local scripts of skipped sweeps survive and stay referenced
    assert!(ws.output().join("net_lr.sh").exists());
    assert!(ws.read_output("runall.sh").contains("./net_lr.sh\n"));
}

#[test]
fn test_sweep_change_regenerates_only_that_sweep() {
    let ws = two_sweep_workspace();
    ws.generate();

    ws.write_manifest(&json!({
        "net": {"single": {
            "depth": ["model.depth", "list(2, 4)"],
            "lr": ["model.lr", "rng(3,0.1,0.1)"]
        }}
    }));
    let report = ws.generate();

    assert_eq!(report.generated, 3);
    let lr = report.sweeps.iter().find(|s| s.sweep == "lr").unwrap();
    assert_eq!(lr.status, SweepStatus::Regenerated);
    assert!(lr.sweep_changed);
    assert!(!lr.base_changed);
    let depth = report.sweeps.iter().find(|s| s.sweep == "depth").unwrap();
    assert_eq!(depth.status, SweepStatus::Skipped);

    assert_eq!(
        ws.read_output("runchanged.sh"),
        "#!/bin/bash\ncd exps\n./net_lr.sh\ncd ..\n"
    );
    assert_eq!(
        ws.read_output("runall.sh"),
        "#!/bin/bash\ncd exps\n./net_depth.sh\n./net_lr.sh\ncd ..\n"
    );
}

#[test]
fn test_base_change_regenerates_every_sweep() {
    let ws = two_sweep_workspace();
    ws.generate();

    ws.write_base("net", &json!({"model": {"lr": 0.1, "depth": 5}}));
    let report = ws.generate();

    assert_eq!(report.generated, 4);
    assert!(report
        .sweeps
        .iter()
        .all(|s| s.status == SweepStatus::Regenerated && s.base_changed && !s.sweep_changed));
    assert_eq!(
        ws.read_config("net_lr_00_0.1.json"),
        json!({"model": {"lr": 0.1, "depth": 5}})
    );
}

#[test]
fn test_base_key_order_is_not_a_change() {
    let ws = TestWorkspace::new();
    ws.write_base_raw("net", r#"{"a": 1, "b": {"c": 2, "d": 3}}"#);
    ws.write_manifest(&json!({"net": {"single": {"a": ["a", "list(1)"]}}}));
    ws.generate();

    ws.write_base_raw("net", r#"{"b": {"d": 3, "c": 2}, "a": 1}"#);
    let report = ws.generate();
    assert_eq!(report.generated, 0);
}

#[test]
fn test_corrupt_store_treated_as_empty() {
    let ws = two_sweep_workspace();
    ws.generate();
    fs::write(ws.output().join("hashes.hash"), "not json at all").unwrap();

    let report = ws.generate();
    assert_eq!(report.generated, 4);

    let store = FingerprintStore::load_from_disk(ws.output().join("hashes.hash"))
        .unwrap()
        .unwrap();
    assert_eq!(store.len(), 3);
    assert!(store.get("net").is_some());
    assert!(store.get("net.lr").is_some());
    assert!(store.get("net.depth").is_some());
}

#[test]
fn test_new_sweep_is_generated_alongside_skipped() {
    let ws = two_sweep_workspace();
    ws.generate();

    ws.write_manifest(&json!({
        "net": {"single": {
            "depth": ["model.depth", "list(2, 4)"],
            "lr": ["model.lr", "rng(2,0.1,0.1)"],
            "wide": ["model.depth", "geo(2, 8, 2)"]
        }}
    }));
    let report = ws.generate();

    assert_eq!(report.generated, 2);
    assert_eq!(
        ws.generated_configs(),
        vec!["net_wide_00_8.0.json", "net_wide_01_16.0.json"]
    );
    assert_eq!(report.skipped().count(), 2);
}

#[test]
fn test_failed_run_keeps_previous_store() {
    let ws = two_sweep_workspace();
    ws.generate();
    let before = ws.read_output("hashes.hash");

    ws.write_manifest(&json!({
        "net": {"single": {"lr": ["optim.lr", "list(1)"]}}
    }));
    let err = sweepgen::planner::ExperimentPlanner::new(ws.root(), &ws.config)
        .generate(false)
        .unwrap_err();
    assert!(matches!(err, sweepgen::error::ApiError::Mutation { .. }));
    assert_eq!(ws.read_output("hashes.hash"), before);
}
