//! Output directory handling
//!
//! Generated configs and scripts are written flat into one directory. Only the top level of
//! the directory is ever scanned; result directories created by the external tool are left
//! alone.

use crate::error::StorageError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Permission bits applied to every generated script
pub const SCRIPT_MODE: u32 = 0o754;

/// Flat directory receiving generated configs and scripts
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Create the directory if needed and delete every top-level `*.json` file
    ///
    /// Returns the number of files removed.
    pub fn prepare(&self) -> Result<usize, StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        let stale = self.files_with_extension("json")?;
        for path in &stale {
            fs::remove_file(path).map_err(|e| StorageError::io(path, e))?;
        }
        debug!(dir = %self.root.display(), removed = stale.len(), "Cleared generated configs");
        Ok(stale.len())
    }

    /// Write a generated config as compact JSON
    pub fn write_config(&self, file_name: &str, document: &Value) -> Result<PathBuf, StorageError> {
        let path = self.path_of(file_name);
        let bytes = serde_json::to_vec(document)?;
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;
        Ok(path)
    }

    /// Write a script body
    pub fn write_script(&self, file_name: &str, body: &str) -> Result<PathBuf, StorageError> {
        let path = self.path_of(file_name);
        fs::write(&path, body).map_err(|e| StorageError::io(&path, e))?;
        Ok(path)
    }

    /// Mark every top-level `*.sh` file executable
    ///
    /// Returns the scripts touched. Permission bits are only changed on Unix.
    pub fn mark_scripts_executable(&self) -> Result<Vec<PathBuf>, StorageError> {
        let scripts = self.files_with_extension("sh")?;
        for path in &scripts {
            set_executable(path)?;
        }
        Ok(scripts)
    }

    /// Top-level files with the given extension, sorted by path
    pub fn files_with_extension(&self, extension: &str) -> Result<Vec<PathBuf>, StorageError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some(extension)
            {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), StorageError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(SCRIPT_MODE))
        .map_err(|e| StorageError::io(path, e))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}
