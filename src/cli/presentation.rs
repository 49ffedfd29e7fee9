//! CLI presentation: text and json formatters for run reports.

use crate::error::{ApiError, StorageError};
use crate::planner::{RunReport, SweepStatus};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::Value;

/// Format a section heading with bold/underline.
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Summary printed after `generate`: per-sweep values, total count, then the changed script.
pub fn format_generate_summary(report: &RunReport) -> String {
    let mut out = String::new();
    for outcome in report.regenerated() {
        out.push_str(&format!(
            "{:<35}\t{}\t{}\n",
            format!("{}.{}", outcome.base, outcome.sweep),
            outcome.values.len(),
            Value::Array(outcome.values.clone())
        ));
    }
    let skipped = report.skipped().count();
    if skipped > 0 {
        out.push_str(&format!("Skipped {} unchanged sweep(s)\n", skipped));
    }
    out.push_str(&format!("Generated {} configurations\n\n", report.generated));
    out.push_str(&report.changed_script);
    out
}

/// Human-readable `status` table.
pub fn format_status_text(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Sweep Status")));

    if report.sweeps.is_empty() {
        out.push_str("No sweeps defined in manifest.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Base", "Sweep", "Path", "State", "Reason", "Configs"]);
    for outcome in &report.sweeps {
        let state = match outcome.status {
            SweepStatus::Regenerated => format!("{}", "regenerate".yellow()),
            SweepStatus::Skipped => format!("{}", "up to date".green()),
        };
        let reason = match (outcome.base_changed, outcome.sweep_changed) {
            (true, true) => "base + sweep changed",
            (true, false) => "base changed",
            (false, true) => "sweep changed",
            (false, false) => "-",
        };
        table.add_row(vec![
            outcome.base.clone(),
            outcome.sweep.clone(),
            outcome.path.clone(),
            state,
            reason.to_string(),
            outcome.files.len().to_string(),
        ]);
    }
    out.push_str(&table.to_string());
    out.push_str(&format!(
        "\n\n{} of {} sweep(s) would regenerate, {} config(s) in total\n",
        report.regenerated().count(),
        report.sweeps.len(),
        report.generated
    ));
    out
}

/// JSON `status` output.
pub fn format_status_json(report: &RunReport) -> Result<String, ApiError> {
    serde_json::to_string_pretty(report).map_err(|e| ApiError::StorageError(StorageError::Serialize(e)))
}
