//! Error types.
//!
//! Validation errors are shown to the user and never change state. Persistence
//! errors are logged by the task store and never reach the user. The umbrella
//! [`Error`] is what command handlers return to `main`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fields::Field;

/// Minimum trimmed length of a task subject.
pub const MIN_SUBJECT_LEN: usize = 3;

/// A draft that cannot become a task record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: Field },

    #[error("Subject needs at least {min} characters (got {actual})")]
    SubjectTooShort { min: usize, actual: usize },
}

/// Storage read/write failure for a single key.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error on key '{key}': {source}")]
    Io { key: String, source: io::Error },

    #[error("Failed to serialize key '{key}': {source}")]
    Serialize { key: String, source: serde_json::Error },

    #[error("Malformed JSON under key '{key}': {source}")]
    Parse { key: String, source: serde_json::Error },
}

/// Failure loading `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Could not determine a data directory; pass --data-dir or set TUGAS_DIR")]
    NoDataDir,
}

/// Errors surfaced by command handlers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Task {0} not found")]
    NotFound(String),

    #[error("Could not understand deadline '{0}'")]
    InvalidDeadline(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
