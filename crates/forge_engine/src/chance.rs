//! # Chance Models
//!
//! A chance model turns one attempt (item state + scroll + optional
//! offering) into a success probability and the grace the item carries
//! afterwards. The upgrade and compound mechanics share this shape but not
//! their constants; see [`crate::upgrade`] and [`crate::compound`].

use forge_catalog::{CatalogLookup, Mechanic, OfferingDefinition, ScrollDefinition};

use crate::error::EngineResult;
use crate::state::ItemState;

/// One attempt to evaluate.
#[derive(Clone, Copy, Debug)]
pub struct Attempt<'a> {
    /// Item state going into the attempt.
    pub item: &'a ItemState,
    /// Scroll used. `None` is an unobtainable placeholder tier.
    pub scroll: Option<&'a ScrollDefinition>,
    /// Offering used, if any.
    pub offering: Option<&'a OfferingDefinition>,
}

/// Outcome of evaluating an attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttemptChance {
    /// Success probability in `[0, 1]`.
    pub chance: f64,
    /// Grace carried by the item after the attempt.
    pub new_grace: f64,
}

impl AttemptChance {
    /// The scroll cannot act on the item.
    pub const IMPOSSIBLE: Self = Self {
        chance: 0.0,
        new_grace: 0.0,
    };

    /// Whether the attempt can ever succeed.
    #[inline]
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.chance > 0.0
    }
}

/// Relation between an offering's grade and the item's grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferingRelation {
    /// Two or more grades above the item.
    FarAbove,
    /// Exactly one grade above.
    Above,
    /// Same grade.
    Equal,
    /// Exactly one grade below.
    Below,
    /// Two or more grades below.
    FarBelow,
}

impl OfferingRelation {
    /// Classifies `offering_grade` against `item_grade`.
    #[must_use]
    pub fn of(offering_grade: u8, item_grade: u8) -> Self {
        match i16::from(offering_grade) - i16::from(item_grade) {
            2.. => Self::FarAbove,
            1 => Self::Above,
            0 => Self::Equal,
            -1 => Self::Below,
            _ => Self::FarBelow,
        }
    }
}

/// Success-probability model for one mechanic.
pub trait ChanceModel {
    /// Mechanic this model evaluates.
    fn mechanic(&self) -> Mechanic;

    /// Evaluates one attempt.
    ///
    /// # Errors
    ///
    /// Catalog errors only (unknown item, missing chance-table entry).
    /// A scroll that cannot act on the item is [`AttemptChance::IMPOSSIBLE`].
    fn evaluate<C: CatalogLookup + ?Sized>(
        &self,
        catalog: &C,
        attempt: Attempt<'_>,
    ) -> EngineResult<AttemptChance>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offering_relation() {
        assert_eq!(OfferingRelation::of(3, 0), OfferingRelation::FarAbove);
        assert_eq!(OfferingRelation::of(2, 0), OfferingRelation::FarAbove);
        assert_eq!(OfferingRelation::of(2, 1), OfferingRelation::Above);
        assert_eq!(OfferingRelation::of(1, 1), OfferingRelation::Equal);
        assert_eq!(OfferingRelation::of(1, 2), OfferingRelation::Below);
        assert_eq!(OfferingRelation::of(1, 3), OfferingRelation::FarBelow);
    }

    #[test]
    fn test_impossible_is_infeasible() {
        assert!(!AttemptChance::IMPOSSIBLE.is_feasible());
    }
}
