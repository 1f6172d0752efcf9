//! Error types for the Yana Flow data layer.
//!
//! Library crates use [`YanaFlowError`] via `thiserror`. Callers that only
//! care about "did the catalog load" read the session store state instead.

use std::path::PathBuf;

/// Top-level error type for all data layer operations.
#[derive(Debug, thiserror::Error)]
pub enum YanaFlowError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP error (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered a table query with an error object.
    #[error("backend error on table `{table}`: {message}")]
    Backend { table: String, message: String },

    /// Row payload could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad URL, invalid setting, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, YanaFlowError>;

impl YanaFlowError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a backend error for the given table.
    pub fn backend(table: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Backend {
            table: table.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
