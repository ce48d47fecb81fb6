//! CLI error type.

use std::path::PathBuf;

use forge_catalog::CatalogError;
use forge_engine::EngineError;
use thiserror::Error;

/// Everything that can stop a `forge` run.
#[derive(Error, Debug)]
pub enum CliError {
    /// Catalog could not be loaded or queried.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The engine rejected the request.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Settings file could not be read.
    #[error("cannot read settings {path}: {source}")]
    SettingsIo {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Settings file is not valid.
    #[error("invalid settings {path}: {source}")]
    Settings {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// A command-line value is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// JSON output failed.
    #[error("cannot encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the CLI.
pub type CliResult<T> = Result<T, CliError>;
