//! Internal error taxonomy (§4.10 / C10).
//!
//! Neither of these ever crosses the public `getVariables`/`setVariables`/
//! `handleGetBaseReport` boundary (§7) — they are the `Result` error types
//! used to *build* a manager (config load, store construction), not the
//! per-item rejection types produced while it runs.

use std::path::PathBuf;
use thiserror::Error;

/// Failures loading or validating `device_model.toml` (§4.8).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error while accessing `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Failures from a `ConfigurationKeyStore` backend (§4.9). The in-memory
/// backend is infallible; this is exercised only by the SQLite backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error while accessing `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
