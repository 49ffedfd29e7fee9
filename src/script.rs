//! Run script assembly
//!
//! Three kinds of script are produced: one local script per base/sweep pair listing a run
//! command per generated config, and two aggregates (`runchanged.sh`, `runall.sh`) that call
//! local scripts from inside the output directory. Lines are kept in insertion order.

use crate::config::RunnerConfig;
use std::path::{Component, Path};

pub const SHEBANG: &str = "#!/bin/bash";
pub const CHANGED_SCRIPT: &str = "runchanged.sh";
pub const ALL_SCRIPT: &str = "runall.sh";

/// Accumulated script text: fixed prologue, body lines, fixed epilogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBody {
    prologue: Vec<String>,
    lines: Vec<String>,
    epilogue: Vec<String>,
}

impl ScriptBody {
    fn new(prologue: Vec<String>, epilogue: Vec<String>) -> Self {
        Self {
            prologue,
            lines: Vec::new(),
            epilogue,
        }
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Body lines without prologue or epilogue
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when no command or script reference has been appended
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Full script text, newline terminated
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self
            .prologue
            .iter()
            .chain(self.lines.iter())
            .chain(self.epilogue.iter())
        {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Run script for a single base/sweep pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalScript {
    body: ScriptBody,
    runs: usize,
}

impl LocalScript {
    /// Start a local script; results left by earlier runs under `<stem>*/` are removed first
    pub fn new(stem: &str) -> Self {
        Self {
            body: ScriptBody::new(
                vec![SHEBANG.to_string(), format!("rm -rf {}*/", shell_quote(stem))],
                Vec::new(),
            ),
            runs: 0,
        }
    }

    /// Append the announce / pause / invoke block for one generated config
    pub fn push_run(&mut self, file_name: &str, runner: &RunnerConfig, params: &str) {
        self.body
            .push(format!("echo {}", shell_quote(&format!("Running {}", file_name))));
        self.body.push(format!(" sleep {}", runner.pause_secs));
        let command = format!("{} {} {}", runner.command, shell_quote(file_name), params);
        self.body.push(command.trim_end().to_string());
        self.runs += 1;
    }

    /// Number of run blocks appended
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn body(&self) -> &ScriptBody {
        &self.body
    }

    pub fn render(&self) -> String {
        self.body.render()
    }
}

/// Script that invokes other scripts from inside the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateScript {
    body: ScriptBody,
}

impl AggregateScript {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            body: ScriptBody::new(
                vec![
                    SHEBANG.to_string(),
                    format!("cd {}", shell_quote(&output_dir.display().to_string())),
                ],
                vec![format!("cd {}", return_path(output_dir))],
            ),
        }
    }

    /// Reference a local script by file name
    pub fn push_script(&mut self, script_name: &str) {
        self.body
            .push(shell_quote(&format!("./{}", script_name)));
    }

    pub fn body(&self) -> &ScriptBody {
        &self.body
    }

    pub fn render(&self) -> String {
        self.body.render()
    }
}

/// Quote a word for bash unless it is made only of characters bash treats literally
pub fn shell_quote(word: &str) -> String {
    let literal = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./,+:=@%".contains(c));
    if literal {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// `..` segments that climb back out of a relative directory
fn return_path(dir: &Path) -> String {
    let depth = dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        .max(1);
    vec![".."; depth].join("/")
}

/// The two aggregates of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSet {
    pub changed: AggregateScript,
    pub all: AggregateScript,
}

impl ScriptSet {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            changed: AggregateScript::new(output_dir),
            all: AggregateScript::new(output_dir),
        }
    }
}
