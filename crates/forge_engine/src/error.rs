//! # Engine Error Types
//!
//! Infeasible attempts are not errors: they are chance 0 and lose every
//! comparison. Errors here are configuration bugs or calls the engine
//! cannot answer.

use forge_catalog::{CatalogError, Mechanic};
use thiserror::Error;

/// Errors that can occur in the enhancement engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The item advances through the other mechanic.
    #[error("{item} is not a {expected} item")]
    WrongMechanic {
        /// The item that was passed.
        item: String,
        /// The mechanic the call expected.
        expected: Mechanic,
    },

    /// The item cannot advance any further.
    #[error("{item} is already at its maximum level {level}")]
    MaxLevel {
        /// The item that was passed.
        item: String,
        /// Its current level.
        level: u32,
    },

    /// Every enumerated selection has zero chance or infinite cost.
    #[error("no feasible selection for {item} at level {level}")]
    NoFeasibleSelection {
        /// The item that was passed.
        item: String,
        /// Its current level.
        level: u32,
    },
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
