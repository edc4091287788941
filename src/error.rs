//! Unified error types for Drill.
//!
//! The engine itself is pure in-memory logic, so most domain faults (a guess
//! outside the working set, a catalog smaller than the set size) are absorbed
//! where they happen. The errors here cover the shell around the engine:
//! loading catalogs and configuration, and rejecting unusable input.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Drill operations.
#[derive(Error, Debug)]
pub enum DrillError {
    /// I/O errors from catalog or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading or validation errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Catalog construction errors (empty catalog, duplicate ids).
    #[error("catalog error: {message}")]
    Catalog { message: String },

    /// Operations attempted in a state that cannot support them.
    #[error("invalid state: {message}")]
    InvalidState { message: String },
}

/// A specialized Result type for Drill operations.
pub type Result<T> = std::result::Result<T, DrillError>;

impl DrillError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}

impl From<io::Error> for DrillError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for DrillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DrillError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and carry on with a safe value. Used where a broken config
/// file must not stop a learner from drilling.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the drill CLI.
pub mod exit_codes {
    /// Session ended normally.
    pub const OK: i32 = 0;

    /// A command failed (bad catalog, unwritable config).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
