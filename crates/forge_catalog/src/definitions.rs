//! # Catalog Definitions
//!
//! Plain data loaded from the catalog document. Nothing here is mutated
//! after load.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grade;

/// The two level-advancement mechanics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mechanic {
    /// A single held item advances one level per success.
    Upgrade,
    /// Three same-level copies are consumed to produce one item a level higher.
    Compound,
}

impl Mechanic {
    /// Number of target levels covered by this mechanic's base chance table.
    #[inline]
    #[must_use]
    pub const fn table_levels(self) -> usize {
        match self {
            Self::Upgrade => 12,
            Self::Compound => 10,
        }
    }

    /// Copies of the item consumed by a single attempt.
    #[inline]
    #[must_use]
    pub const fn copies_per_attempt(self) -> u32 {
        match self {
            Self::Upgrade => 1,
            Self::Compound => 3,
        }
    }
}

impl fmt::Display for Mechanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upgrade => f.write_str("upgrade"),
            Self::Compound => f.write_str("compound"),
        }
    }
}

/// An enhanceable item as described by the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Catalog key.
    pub name: String,
    /// How this item advances.
    pub mechanic: Mechanic,
    /// Ascending level thresholds. `grades[0..3]` mark grade increases,
    /// `grades[3]` is the maximum level.
    pub grades: [u32; 4],
    /// Base market price in gold.
    pub price: f64,
}

impl ItemDefinition {
    /// Grade of this item at `level`.
    #[inline]
    #[must_use]
    pub fn grade(&self, level: u32) -> u8 {
        grade::classify(&self.grades, level)
    }

    /// Highest level the item can reach.
    #[inline]
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.grades[3]
    }

    /// Base chance table row used for an attempt from `level`.
    ///
    /// Upgrades always read the zero-grade row. Compounds consume three
    /// copies, so from level 3 on they read the row of the grade two levels
    /// below.
    #[inline]
    #[must_use]
    pub fn chance_row(&self, level: u32) -> u8 {
        match self.mechanic {
            Mechanic::Compound if level >= 3 => self.grade(level - 2),
            _ => self.grade(0),
        }
    }
}

/// A scroll: required for every attempt, gates the grades it can act on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollDefinition {
    /// Mechanic this scroll is used with.
    pub mechanic: Mechanic,
    /// Tier index, 0-4.
    pub tier: u8,
    /// Highest item grade the scroll can act on.
    pub grade: u8,
    /// Price in gold. May be infinite for placeholder tiers.
    pub price: f64,
}

/// An optional consumable that boosts success probability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferingDefinition {
    /// Tier index, 1-3. Tier 0 means "no offering" and is never defined.
    pub tier: u8,
    /// Grade of the offering, compared against the item's grade.
    pub grade: u8,
    /// Price in gold.
    pub price: f64,
}
