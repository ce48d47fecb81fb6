//! # Compound Chance Model
//!
//! Three same-level copies are consumed per attempt. The base chance row
//! comes from a lower reference level once the item reaches level 3, grace
//! from all three copies is pooled, and the cap scales with how far the
//! scroll's grade exceeds the item's.
//!
//! Constants are tuned game-balance values, preserved exactly.

use forge_catalog::{CatalogLookup, Mechanic};

use crate::chance::{Attempt, AttemptChance, ChanceModel, OfferingRelation};
use crate::error::EngineResult;

/// From this level on the chance row is read from `level - REFERENCE_DROP`.
const REFERENCE_LEVEL: u32 = 3;
const REFERENCE_DROP: u32 = 2;

/// Multiplier and flat bonus of a higher-grade scroll.
const HIGH_SCROLL_RATE: f64 = 1.1;
const HIGH_SCROLL_BONUS: f64 = 0.001;
/// Grace bonus of a higher-grade scroll.
const HIGH_SCROLL_GRACE: f64 = 0.4;

/// Grace scale when an offering is used: `0.027 * (3 * grace + 0.5)`.
const OFFERING_GRACE_SCALE: f64 = 0.027;
const OFFERING_GRACE_BASE: f64 = 0.5;
/// Grace bonus of an offering before the relation adjusts it.
const DEFAULT_OFFERING_GAIN: f64 = 0.5;

const FAR_ABOVE_RATE: f64 = 1.64;
const FAR_ABOVE_GRACE_WEIGHT: f64 = 2.0;
const FAR_ABOVE_GRACE_GAIN: f64 = 3.0;
const ABOVE_RATE: f64 = 1.48;
const ABOVE_GRACE_GAIN: f64 = 1.0;
const EQUAL_RATE: f64 = 1.36;
const EQUAL_GRACE_LIMIT: f64 = 30.0 * 0.027;
const BELOW_RATE: f64 = 1.15;
const BELOW_GRACE_LIMIT: f64 = 25.0 * 0.019;
const BELOW_GRACE_GAIN: f64 = 0.2;
const FAR_BELOW_RATE: f64 = 1.08;
const FAR_BELOW_GRACE_LIMIT: f64 = 15.0 * 0.015;
const FAR_BELOW_GRACE_GAIN: f64 = 0.1;

/// Grace scale and limit when no offering is used.
const BARE_GRACE_SCALE: f64 = 0.007;
const BARE_GRACE_LIMIT: f64 = 25.0 * 0.007;

/// Pooled grace is divided by this after the attempt.
const GRACE_POOL_DIVISOR: f64 = 6.4;

/// Cap: `min(base * (3 + 0.6 h), base + 0.2 + 0.05 h)` for scroll-grade gap `h`.
const CAP_MUL: f64 = 3.0;
const CAP_MUL_PER_GAP: f64 = 0.6;
const CAP_ADD: f64 = 0.2;
const CAP_ADD_PER_GAP: f64 = 0.05;

/// Chance model for the compound mechanic.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompoundChance;

impl ChanceModel for CompoundChance {
    fn mechanic(&self) -> Mechanic {
        Mechanic::Compound
    }

    fn evaluate<C: CatalogLookup + ?Sized>(
        &self,
        catalog: &C,
        attempt: Attempt<'_>,
    ) -> EngineResult<AttemptChance> {
        let item = attempt.item;
        let Some(scroll) = attempt.scroll else {
            return Ok(AttemptChance::IMPOSSIBLE);
        };

        let definition = catalog.item_definition(&item.name)?;
        let grade = definition.grade(item.level);
        if grade > scroll.grade {
            return Ok(AttemptChance::IMPOSSIBLE);
        }

        let new_level = item.level + 1;
        let reference_grade = if item.level >= REFERENCE_LEVEL {
            definition.grade(item.level - REFERENCE_DROP)
        } else {
            catalog.zero_grade(&item.name)?
        };
        let base = catalog
            .base_chance_table(Mechanic::Compound)
            .chance(reference_grade, new_level)?;
        let level = f64::from(item.level);

        let mut probability = base;
        let mut high: u8 = 0;
        let mut grace_bonus = 0.0;

        if scroll.grade > grade {
            probability = probability * HIGH_SCROLL_RATE + HIGH_SCROLL_BONUS;
            grace_bonus += HIGH_SCROLL_GRACE;
            high = scroll.grade - grade;
        }

        let pooled_grace = if let Some(offering) = attempt.offering {
            let grace = OFFERING_GRACE_SCALE * (item.grace * 3.0 + OFFERING_GRACE_BASE);
            let gain = match OfferingRelation::of(offering.grade, grade) {
                OfferingRelation::FarAbove => {
                    probability = probability * FAR_ABOVE_RATE + grace * FAR_ABOVE_GRACE_WEIGHT;
                    high = 1;
                    FAR_ABOVE_GRACE_GAIN
                }
                OfferingRelation::Above => {
                    probability = probability * ABOVE_RATE + grace;
                    high = 1;
                    ABOVE_GRACE_GAIN
                }
                OfferingRelation::Equal => {
                    probability = probability * EQUAL_RATE + EQUAL_GRACE_LIMIT.min(grace);
                    DEFAULT_OFFERING_GAIN
                }
                OfferingRelation::Below => {
                    probability = probability * BELOW_RATE
                        + BELOW_GRACE_LIMIT.min(grace) / (level - 2.0).max(1.0);
                    BELOW_GRACE_GAIN
                }
                OfferingRelation::FarBelow => {
                    probability = probability * FAR_BELOW_RATE
                        + FAR_BELOW_GRACE_LIMIT.min(grace) / (level - 1.0).max(1.0);
                    FAR_BELOW_GRACE_GAIN
                }
            };
            grace_bonus += gain;
            item.grace * 3.0
        } else {
            let grace = BARE_GRACE_SCALE * item.grace;
            probability += BARE_GRACE_LIMIT.min(grace) / (level - 1.0).max(1.0);
            item.grace
        };

        let gap = f64::from(high);
        let cap = (base * (CAP_MUL + gap * CAP_MUL_PER_GAP))
            .min(base + CAP_ADD + gap * CAP_ADD_PER_GAP);
        probability = probability.min(cap);

        Ok(AttemptChance {
            chance: probability.clamp(0.0, 1.0),
            new_grace: pooled_grace / GRACE_POOL_DIVISOR + grace_bonus,
        })
    }
}
