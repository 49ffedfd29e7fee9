//! Shared test utilities for integration tests
//!
//! Builds throwaway workspaces containing a manifest and base configs, and reads back the
//! generated output directory.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use sweepgen::config::GeneratorConfig;
use sweepgen::planner::{ExperimentPlanner, RunReport};
use tempfile::TempDir;

/// Temporary workspace with the conventional layout
pub struct TestWorkspace {
    dir: TempDir,
    pub config: GeneratorConfig,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            config: GeneratorConfig::default(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("exps")
    }

    pub fn write_manifest(&self, manifest: &Value) {
        fs::write(
            self.root().join("pyxperiments.json"),
            serde_json::to_vec_pretty(manifest).unwrap(),
        )
        .unwrap();
    }

    pub fn write_base(&self, name: &str, document: &Value) {
        fs::write(
            self.root().join(format!("{}.json", name)),
            serde_json::to_vec_pretty(document).unwrap(),
        )
        .unwrap();
    }

    /// Write a base config from raw text (to control key order)
    pub fn write_base_raw(&self, name: &str, text: &str) {
        fs::write(self.root().join(format!("{}.json", name)), text).unwrap();
    }

    pub fn generate(&self) -> RunReport {
        ExperimentPlanner::new(self.root(), &self.config)
            .generate(false)
            .unwrap()
    }

    pub fn read_output(&self, file_name: &str) -> String {
        fs::read_to_string(self.output().join(file_name)).unwrap()
    }

    pub fn read_config(&self, file_name: &str) -> Value {
        serde_json::from_str(&self.read_output(file_name)).unwrap()
    }

    /// Sorted names of top-level `*.json` files in the output directory
    pub fn generated_configs(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.output())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".json"))
            .collect();
        names.sort();
        names
    }
}
