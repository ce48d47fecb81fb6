//! # FORGE Catalog
//!
//! The game data behind the FORGE enhancement engine.
//!
//! ## Design Principles
//!
//! 1. **Load once, read forever** - The catalog is immutable after loading
//! 2. **Fail at load, not mid-chain** - Every chance-table lookup a chain can
//!    make is validated before the engine runs
//! 3. **Derived, never stored** - Grades are computed from level thresholds
//! 4. **External configuration** - All balance data in TOML files
//!
//! ## Thread Safety
//!
//! [`Catalog`] is `Sync`. The only interior mutability is the zero-grade
//! cache, whose population is idempotent.
//!
//! ## Example
//!
//! ```rust,ignore
//! use forge_catalog::{Catalog, CatalogLookup};
//!
//! let catalog = Catalog::from_path("data/catalog.toml")?;
//! let grade = catalog.grade("pinkie", 8)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod definitions;
pub mod error;
pub mod grade;
pub mod tables;

pub use catalog::{
    Catalog, CatalogDocument, CatalogLookup, ChanceDocument, MAX_OFFERING_TIER, MAX_SCROLL_TIER,
};
pub use definitions::{ItemDefinition, Mechanic, OfferingDefinition, ScrollDefinition};
pub use error::{CatalogError, CatalogResult};
pub use grade::{classify, ZeroGradeCache, MAX_GRADE, ZERO_GRADES};
pub use tables::BaseChanceTable;
