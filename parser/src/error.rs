//! Error types for import operations.
//!
//! Only file-level problems surface as errors. Anything wrong *inside* a dump
//! (unknown opcodes, stray options, dangling references) is absorbed by the
//! parser and reported through diagnostics instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while importing dumps or loading configuration.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A dump or config file could not be read or written.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is syntactically valid but unusable.
    #[error("invalid config: {0}")]
    Config(String),

    /// Batch worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`ImportError`].
pub type Result<T> = std::result::Result<T, ImportError>;
