//! Sweep manifest model
//!
//! ```json
//! {
//!   "base": {
//!     "cfg": "--release",
//!     "single": { "lr": ["model.lr", "rng(3, 0.1, 0.1)"] }
//!   }
//! }
//! ```
//!
//! Each base config name maps to the fixed run parameters and its named sweeps. A sweep is an
//! array whose first element is the mutation path and whose remaining elements are generators.

use crate::error::{ApiError, ManifestError, StorageError};
use crate::expand::Generator;
use crate::mutation::MutationPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parsed manifest: base config name → entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    bases: BTreeMap<String, BaseEntry>,
}

/// One base configuration and its sweeps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseEntry {
    /// Extra parameters appended to every run command
    #[serde(rename = "cfg", default)]
    pub params: String,

    #[serde(rename = "single", alias = "sweeps", default)]
    pub sweeps: BTreeMap<String, SweepSpec>,
}

/// Mutation path plus generators, as declared in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct SweepSpec {
    path: MutationPath,
    generators: Vec<Generator>,
    raw: Value,
}

impl SweepSpec {
    pub fn path(&self) -> &MutationPath {
        &self.path
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// The definition exactly as written, used for fingerprinting
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl TryFrom<Value> for SweepSpec {
    type Error = ManifestError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let items = raw.as_array().ok_or_else(|| {
            ManifestError::InvalidSweep(format!("expected [path, generator, ...], got {}", raw))
        })?;
        let (first, rest) = items
            .split_first()
            .ok_or_else(|| ManifestError::InvalidSweep("empty sweep definition".to_string()))?;
        let path_str = first.as_str().ok_or_else(|| {
            ManifestError::InvalidSweep(format!("mutation path must be a string, got {}", first))
        })?;
        let path = MutationPath::parse(path_str)
            .map_err(|e| ManifestError::InvalidSweep(e.to_string()))?;
        if rest.is_empty() {
            return Err(ManifestError::InvalidSweep(format!(
                "sweep on '{}' has no generators",
                path_str
            )));
        }
        let generators = rest
            .iter()
            .map(Generator::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SweepSpec {
            path,
            generators,
            raw,
        })
    }
}

impl From<SweepSpec> for Value {
    fn from(spec: SweepSpec) -> Self {
        spec.raw
    }
}

impl Manifest {
    /// Load and parse the manifest file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
        let manifest = serde_json::from_slice(&bytes).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(manifest)
    }

    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|e| ManifestError::Parse {
            path: "<inline>".into(),
            source: e,
        })
    }

    /// Base entries in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BaseEntry)> {
        self.bases.iter()
    }

    pub fn get(&self, base: &str) -> Option<&BaseEntry> {
        self.bases.get(base)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}
