//! Simulated item state.

use serde::{Deserialize, Serialize};

/// One physical item instance under simulation.
///
/// Grade is deliberately absent: it is always derived from `(name, level)`
/// through the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// Catalog name of the item.
    pub name: String,
    /// Current level.
    pub level: u32,
    /// Accumulated grace, never negative.
    pub grace: f64,
}

impl ItemState {
    /// Creates an item state.
    #[must_use]
    pub fn new(name: impl Into<String>, level: u32, grace: f64) -> Self {
        Self {
            name: name.into(),
            level,
            grace,
        }
    }

    /// A fresh level-0 item with no grace.
    #[must_use]
    pub fn fresh(name: impl Into<String>) -> Self {
        Self::new(name, 0, 0.0)
    }

    /// Same item with `extra` grace added.
    #[must_use]
    pub fn with_extra_grace(&self, extra: f64) -> Self {
        Self {
            name: self.name.clone(),
            level: self.level,
            grace: self.grace + extra,
        }
    }
}
