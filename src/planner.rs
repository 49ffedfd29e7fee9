//! Experiment planning
//!
//! Drives the pipeline for every base config in the manifest: fingerprint the base config and
//! each sweep, skip sweeps whose inputs are unchanged, expand the rest into parameter sets,
//! write one mutated config per value, and assemble the run scripts. All state for a run lives
//! in a [`RunContext`] owned by the caller.
//!
//! A change to a base config forces every sweep under it to regenerate. Fingerprints are always
//! refreshed, including for skipped sweeps, and the store is written only after the whole run
//! succeeded.

use crate::config::GeneratorConfig;
use crate::error::{ApiError, ManifestError, StorageError};
use crate::expand::expand;
use crate::fingerprint::{fingerprint, Fingerprint};
use crate::manifest::{BaseEntry, Manifest, SweepSpec};
use crate::mutation;
use crate::naming::{config_file_name, local_script_name, sweep_stem};
use crate::output::OutputDir;
use crate::script::{LocalScript, ScriptSet, ALL_SCRIPT, CHANGED_SCRIPT};
use crate::tracker::{base_identifier, has_changed, sweep_identifier, FingerprintStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, instrument};

/// What happened to one base/sweep pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    /// Configs and local script were (or would be) written
    Regenerated,
    /// Neither the sweep nor its base config changed
    Skipped,
}

/// Per-sweep result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub base: String,
    pub sweep: String,
    pub path: String,
    pub base_changed: bool,
    pub sweep_changed: bool,
    pub status: SweepStatus,
    pub script: String,
    /// Parameter values, empty when skipped
    pub values: Vec<Value>,
    /// Generated config file names, in ordinal order
    pub files: Vec<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of configs generated
    pub generated: usize,
    pub sweeps: Vec<SweepOutcome>,
    /// Rendered `runchanged.sh`
    pub changed_script: String,
    /// Rendered `runall.sh`
    pub all_script: String,
    /// Whether anything was written to disk
    pub written: bool,
}

impl RunReport {
    pub fn regenerated(&self) -> impl Iterator<Item = &SweepOutcome> {
        self.sweeps
            .iter()
            .filter(|s| s.status == SweepStatus::Regenerated)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SweepOutcome> {
        self.sweeps.iter().filter(|s| s.status == SweepStatus::Skipped)
    }
}

/// Mutable state of one run, threaded through every planning step
#[derive(Debug)]
pub struct RunContext {
    previous: FingerprintStore,
    current: FingerprintStore,
    scripts: ScriptSet,
    outcomes: Vec<SweepOutcome>,
    /// File stem → `base.sweep` that claimed it
    stems: BTreeMap<String, String>,
    generated: usize,
    force: bool,
}

impl RunContext {
    /// Start a run against the fingerprints of the previous run
    pub fn new(previous: FingerprintStore, output_dir: &Path, force: bool) -> Self {
        Self {
            previous,
            current: FingerprintStore::new(),
            scripts: ScriptSet::new(output_dir),
            outcomes: Vec::new(),
            stems: BTreeMap::new(),
            generated: 0,
            force,
        }
    }

    /// Fingerprints observed so far in this run
    pub fn current(&self) -> &FingerprintStore {
        &self.current
    }

    pub fn scripts(&self) -> &ScriptSet {
        &self.scripts
    }

    pub fn outcomes(&self) -> &[SweepOutcome] {
        &self.outcomes
    }

    /// Reserve the file stem of a base/sweep pair
    ///
    /// Distinct names can normalize to the same stem (`lr_a` and `lr-a`); the second claim fails.
    pub fn claim_stem(&mut self, base: &str, sweep: &str) -> Result<String, ManifestError> {
        claim(&mut self.stems, base, sweep)
    }

    fn into_report(self, written: bool) -> (RunReport, FingerprintStore) {
        let report = RunReport {
            generated: self.generated,
            sweeps: self.outcomes,
            changed_script: self.scripts.changed.render(),
            all_script: self.scripts.all.render(),
            written,
        };
        (report, self.current)
    }
}

fn claim(
    stems: &mut BTreeMap<String, String>,
    base: &str,
    sweep: &str,
) -> Result<String, ManifestError> {
    let stem = sweep_stem(base, sweep);
    let owner = sweep_identifier(base, sweep);
    match stems.get(&stem) {
        Some(first) if *first != owner => Err(ManifestError::NameCollision {
            stem,
            first: first.clone(),
            second: owner,
        }),
        Some(_) => Ok(stem),
        None => {
            stems.insert(stem.clone(), owner);
            Ok(stem)
        }
    }
}

/// Fail if two sweeps of the manifest would share generated file names
pub fn check_stems(manifest: &Manifest) -> Result<(), ManifestError> {
    let mut stems = BTreeMap::new();
    for (base, entry) in manifest.iter() {
        for sweep in entry.sweeps.keys() {
            claim(&mut stems, base, sweep)?;
        }
    }
    Ok(())
}

/// Orchestrates a run for one workspace
pub struct ExperimentPlanner<'a> {
    workspace_root: PathBuf,
    config: &'a GeneratorConfig,
}

impl<'a> ExperimentPlanner<'a> {
    pub fn new(workspace_root: impl Into<PathBuf>, config: &'a GeneratorConfig) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            config,
        }
    }

    /// Run the full pipeline and write every output
    ///
    /// With `force`, every base config counts as changed.
    pub fn generate(&self, force: bool) -> Result<RunReport, ApiError> {
        let manifest = Manifest::load(self.config.manifest_path(&self.workspace_root))?;
        check_stems(&manifest)?;
        let output = OutputDir::new(self.config.output_path(&self.workspace_root));
        let store_path = self.config.store_path(&self.workspace_root);

        output.prepare()?;
        let previous = FingerprintStore::load_or_empty(&store_path);
        let mut ctx = RunContext::new(previous, &self.config.output_dir, force);

        for (base, entry) in manifest.iter() {
            self.plan_base(&mut ctx, base, entry, Some(&output))?;
        }

        output.write_script(CHANGED_SCRIPT, &ctx.scripts.changed.render())?;
        output.write_script(ALL_SCRIPT, &ctx.scripts.all.render())?;
        let scripts = output.mark_scripts_executable()?;
        debug!(count = scripts.len(), "Marked scripts executable");

        let (report, store) = ctx.into_report(true);
        store.save_to_disk(&store_path)?;
        info!(generated = report.generated, "Generated {} configurations", report.generated);
        Ok(report)
    }

    /// Evaluate the pipeline without touching the filesystem
    pub fn status(&self) -> Result<RunReport, ApiError> {
        let manifest = Manifest::load(self.config.manifest_path(&self.workspace_root))?;
        check_stems(&manifest)?;
        let store_path = self.config.store_path(&self.workspace_root);
        let previous = FingerprintStore::load_or_empty(&store_path);
        let mut ctx = RunContext::new(previous, &self.config.output_dir, false);

        for (base, entry) in manifest.iter() {
            self.plan_base(&mut ctx, base, entry, None)?;
        }

        Ok(ctx.into_report(false).0)
    }

    /// Process one base config and all of its sweeps
    #[instrument(skip_all, fields(base = %base))]
    pub fn plan_base(
        &self,
        ctx: &mut RunContext,
        base: &str,
        entry: &BaseEntry,
        output: Option<&OutputDir>,
    ) -> Result<(), ApiError> {
        info!("Creating {} configs", base);
        let document = self.load_base_config(base)?;
        let base_fp = fingerprint(&document)?;
        let base_id = base_identifier(base);
        let base_changed = ctx.force || has_changed(&ctx.previous, &base_id, &base_fp);
        if base_changed {
            info!(fingerprint = %base_fp, "Base config {} has changed", base);
        }
        ctx.current.record(base_id, base_fp);

        for (sweep, spec) in &entry.sweeps {
            self.plan_sweep(
                ctx,
                SweepInput {
                    base,
                    sweep,
                    spec,
                    params: &entry.params,
                    document: &document,
                    base_changed,
                },
                output,
            )?;
        }
        Ok(())
    }

    fn plan_sweep(
        &self,
        ctx: &mut RunContext,
        input: SweepInput<'_>,
        output: Option<&OutputDir>,
    ) -> Result<(), ApiError> {
        let SweepInput {
            base,
            sweep,
            spec,
            params,
            document,
            base_changed,
        } = input;
        let _span = info_span!("sweep", sweep = %sweep).entered();

        let stem = ctx.claim_stem(base, sweep)?;
        let script_name = local_script_name(base, sweep);
        ctx.scripts.all.push_script(&script_name);

        let sweep_id = sweep_identifier(base, sweep);
        let sweep_fp: Fingerprint = fingerprint(spec.raw())?;
        let sweep_changed = has_changed(&ctx.previous, &sweep_id, &sweep_fp);
        ctx.current.record(sweep_id.clone(), sweep_fp);

        let mut outcome = SweepOutcome {
            base: base.to_string(),
            sweep: sweep.to_string(),
            path: spec.path().to_string(),
            base_changed,
            sweep_changed,
            status: SweepStatus::Skipped,
            script: script_name.clone(),
            values: Vec::new(),
            files: Vec::new(),
        };

        if !sweep_changed && !base_changed {
            info!("Config for {} already exist", sweep_id);
            ctx.outcomes.push(outcome);
            return Ok(());
        }

        let parameters = expand(spec.generators()).map_err(|source| ApiError::Expand {
            base: base.to_string(),
            sweep: sweep.to_string(),
            source,
        })?;
        let expanded = Value::Array(parameters.values().to_vec());
        info!(
            count = parameters.len(),
            values = %expanded,
            "Expanded {}",
            sweep
        );

        let mut local = LocalScript::new(&stem);
        for (ordinal, value) in parameters.iter().enumerate() {
            let file_name = config_file_name(base, sweep, ordinal, value);
            let generated =
                mutation::apply(document, spec.path(), value.clone()).map_err(|source| {
                    ApiError::Mutation {
                        base: base.to_string(),
                        sweep: sweep.to_string(),
                        source,
                    }
                })?;
            if let Some(output) = output {
                output.write_config(&file_name, &generated)?;
            }
            local.push_run(&file_name, &self.config.runner, params);
            outcome.files.push(file_name);
            ctx.generated += 1;
        }

        if let Some(output) = output {
            output.write_script(&script_name, &local.render())?;
        }
        ctx.scripts.changed.push_script(&script_name);

        outcome.status = SweepStatus::Regenerated;
        outcome.values = parameters.values().to_vec();
        ctx.outcomes.push(outcome);
        Ok(())
    }

    /// Load `<workspace>/<base>.json`
    fn load_base_config(&self, base: &str) -> Result<Value, ApiError> {
        let path = self.workspace_root.join(format!("{}.json", base));
        let bytes = fs::read(&path).map_err(|e| ApiError::BaseConfig {
            name: base.to_string(),
            source: StorageError::io(&path, e),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::BaseConfig {
            name: base.to_string(),
            source: StorageError::Json {
                path: path.clone(),
                source: e,
            },
        })
    }
}

struct SweepInput<'a> {
    base: &'a str,
    sweep: &'a str,
    spec: &'a SweepSpec,
    params: &'a str,
    document: &'a Value,
    base_changed: bool,
}
