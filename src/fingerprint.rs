//! Content fingerprints for change detection using BLAKE3
//!
//! Values are canonicalized to JSON with mapping keys sorted at every depth before hashing,
//! so two documents that differ only in key order share a fingerprint.

use crate::error::StorageError;
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Hex-encoded digest used only as an equality token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(hex: String) -> Self {
        Fingerprint(hex)
    }
}

/// Compute the fingerprint of any serializable value
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<Fingerprint, StorageError> {
    let bytes = canonical_bytes(value)?;
    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    Ok(Fingerprint(hex::encode(hasher.finalize().as_bytes())))
}

/// Canonical JSON encoding: sorted keys, compact separators
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StorageError> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&canonicalize(value))?)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, item) in entries {
                sorted.insert(key, canonicalize(item));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
