//! Deterministic file naming for generated configs and scripts

use serde_json::Value;

/// Replace underscores with hyphens so `_` can act as the field separator in file names
pub fn normalize(name: &str) -> String {
    name.replace('_', "-")
}

/// Text form of a parameter value as it appears in file names
///
/// Strings appear bare, numbers as JSON number text, anything else as compact JSON.
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stem shared by a base/sweep pair: `<base>_<sweep>`
pub fn sweep_stem(base: &str, sweep: &str) -> String {
    format!("{}_{}", normalize(base), normalize(sweep))
}

/// File name of one generated config: `<stem>_<ordinal>_<value>.json`
pub fn config_file_name(base: &str, sweep: &str, ordinal: usize, value: &Value) -> String {
    format!(
        "{}_{:02}_{}.json",
        sweep_stem(base, sweep),
        ordinal,
        escape_file_component(&normalize(&value_label(value)))
    )
}

/// Percent-escape characters that cannot appear inside a single file name component
///
/// `%` itself is escaped so distinct labels stay distinct.
pub fn escape_file_component(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            '\\' => out.push_str("%5C"),
            '\0' => out.push_str("%00"),
            other => out.push(other),
        }
    }
    out
}

/// File name of the local run script for a base/sweep pair
pub fn local_script_name(base: &str, sweep: &str) -> String {
    format!("{}.sh", sweep_stem(base, sweep))
}
