//! Error types for the sweep generator.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while resolving a mutation path against a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("Mutation path is empty")]
    EmptyPath,

    #[error("Key '{key}' not found at segment {position} of '{path}'")]
    MissingKey {
        path: String,
        position: usize,
        key: String,
    },

    #[error("Index {index} out of range (len {len}) at segment {position} of '{path}'")]
    IndexOutOfRange {
        path: String,
        position: usize,
        index: usize,
        len: usize,
    },

    #[error("Segment {position} of '{path}' expects {expected}, found {found}")]
    WrongContainer {
        path: String,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failures while parsing or evaluating a generator
#[derive(Debug, Error, PartialEq)]
pub enum ExpandError {
    #[error("Malformed generator expression '{expr}': {reason}")]
    Malformed { expr: String, reason: String },

    #[error("Unknown generator '{0}'")]
    UnknownGenerator(String),

    #[error("Generator '{name}' expects {expected} arguments, got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Generator '{name}' argument {position} must be {expected}")]
    ArgumentType {
        name: String,
        position: usize,
        expected: &'static str,
    },

    #[error("Generator '{name}' produced a non-finite value at step {step}")]
    NonFinite { name: String, step: usize },

    #[error("Generator '{name}' asks for {count} values, more than the limit of {max}")]
    TooManyValues {
        name: String,
        count: usize,
        max: usize,
    },

    #[error("Generator '{name}' overflowed at step {step}")]
    Overflow { name: String, step: usize },
}

/// Manifest shape errors
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to parse manifest {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid sweep definition: {0}")]
    InvalidSweep(String),

    #[error("Invalid generator in sweep definition: {0}")]
    Generator(#[from] ExpandError),

    #[error("Sweeps '{first}' and '{second}' both map to file stem '{stem}'")]
    NameCollision {
        stem: String,
        first: String,
        second: String,
    },
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Top-level errors surfaced by the planner and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Manifest error: {0}")]
    ManifestError(#[from] ManifestError),

    #[error("Base config '{name}' could not be loaded: {source}")]
    BaseConfig {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("Sweep '{sweep}' of base config '{base}': {source}")]
    Mutation {
        base: String,
        sweep: String,
        #[source]
        source: MutationError,
    },

    #[error("Sweep '{sweep}' of base config '{base}': {source}")]
    Expand {
        base: String,
        sweep: String,
        #[source]
        source: ExpandError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
