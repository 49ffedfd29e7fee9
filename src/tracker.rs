//! Fingerprint store and change detection
//!
//! The store maps a dotted identifier (`base` or `base.sweep`) to the fingerprint observed on
//! the last completed run. It is loaded once, rebuilt in memory during a run, and written back
//! whole at the end; entries not touched by the run are dropped.

use crate::error::StorageError;
use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Persisted identifier → fingerprint mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintStore {
    entries: BTreeMap<String, Fingerprint>,
}

impl FingerprintStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&Fingerprint> {
        self.entries.get(identifier)
    }

    /// Record the latest fingerprint for an identifier, replacing any previous one
    pub fn record(&mut self, identifier: impl Into<String>, fingerprint: Fingerprint) {
        self.entries.insert(identifier.into(), fingerprint);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Fingerprint)> {
        self.entries.iter()
    }

    /// Load the store from disk
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load_from_disk<P: AsRef<Path>>(path: P) -> Result<Option<Self>, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
        let store = serde_json::from_slice(&bytes).map_err(|e| StorageError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Some(store))
    }

    /// Load the store, treating a missing or unreadable file as an empty store
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_from_disk(path) {
            Ok(Some(store)) => {
                debug!(path = %path.display(), entries = store.len(), "Loaded fingerprint store");
                store
            }
            Ok(None) => {
                info!(path = %path.display(), "No existing fingerprints found");
                FingerprintStore::new()
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load fingerprint store, starting with empty store"
                );
                FingerprintStore::new()
            }
        }
    }

    /// Save the store to disk atomically
    ///
    /// Uses temporary file + rename for atomic writes.
    pub fn save_to_disk<P: AsRef<Path>>(&self, path: P) -> Result<(), StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        let bytes = serde_json::to_vec(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes).map_err(|e| StorageError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }
}

/// True unless `identifier` is present in `store` with exactly `fingerprint`
pub fn has_changed(store: &FingerprintStore, identifier: &str, fingerprint: &Fingerprint) -> bool {
    match store.get(identifier) {
        Some(previous) => previous != fingerprint,
        None => true,
    }
}

/// Store identifier for a base config
pub fn base_identifier(base: &str) -> String {
    base.to_string()
}

/// Store identifier for a sweep under a base config
pub fn sweep_identifier(base: &str, sweep: &str) -> String {
    format!("{}.{}", base, sweep)
}
