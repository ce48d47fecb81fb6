//! # Catalog Error Types
//!
//! Every error here is a configuration error: fatal to the call, never
//! silently defaulted.

use std::path::PathBuf;

use thiserror::Error;

use crate::definitions::Mechanic;

/// Errors that can occur while loading or querying the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No item with this name exists in the catalog.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// No scroll of this tier exists for the mechanic.
    #[error("unknown {mechanic} scroll tier: {tier}")]
    UnknownScroll {
        /// Mechanic the scroll was requested for.
        mechanic: Mechanic,
        /// Requested tier.
        tier: u8,
    },

    /// No offering of this tier exists.
    #[error("unknown offering tier: {0}")]
    UnknownOffering(u8),

    /// The base chance table has no entry for this lookup.
    #[error("no {mechanic} base chance for zero grade {zero_grade} at level {level}")]
    MissingChance {
        /// Table that was queried.
        mechanic: Mechanic,
        /// Row (zero grade) that was queried.
        zero_grade: u8,
        /// Target level that was queried.
        level: u32,
    },

    /// Catalog data failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The catalog document is not valid TOML for the catalog schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// The catalog file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
