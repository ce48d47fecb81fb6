//! # Upgrade Chance Model
//!
//! One held item, one scroll, an optional offering. Grace accumulated on
//! earlier failures raises the chance, and the final probability is capped
//! relative to the table's base chance so no combination produces an
//! unrealistic jump.
//!
//! All numeric constants are tuned game-balance values. Changing any of
//! them changes the simulated economy.

use forge_catalog::{CatalogLookup, Mechanic};

use crate::chance::{Attempt, AttemptChance, ChanceModel, OfferingRelation};
use crate::error::EngineResult;

/// Levels up to which a higher-grade scroll still adds its bonus.
const HIGH_SCROLL_MAX_LEVEL: u32 = 10;
/// Multiplier of a higher-grade scroll.
const HIGH_SCROLL_RATE: f64 = 1.2;
/// Flat bonus of a higher-grade scroll.
const HIGH_SCROLL_BONUS: f64 = 0.01;
/// Grace gained from using a higher-grade scroll.
const HIGH_SCROLL_GRACE: f64 = 0.4;

/// Probability multiplier, grace weight and grace gained per offering relation.
const FAR_ABOVE_RATE: f64 = 1.7;
const FAR_ABOVE_GRACE_WEIGHT: f64 = 4.0;
const FAR_ABOVE_GRACE_GAIN: f64 = 3.0;
const ABOVE_RATE: f64 = 1.5;
const ABOVE_GRACE_WEIGHT: f64 = 1.2;
const ABOVE_GRACE_GAIN: f64 = 1.0;
const EQUAL_RATE: f64 = 1.4;
const EQUAL_GRACE_GAIN: f64 = 0.4;
const BELOW_RATE: f64 = 1.15;
const BELOW_GRACE_DIVISOR: f64 = 3.2;
const BELOW_GRACE_GAIN: f64 = 0.2;
const FAR_BELOW_RATE: f64 = 1.08;
const FAR_BELOW_GRACE_DIVISOR: f64 = 4.0;
const FAR_BELOW_GRACE_GAIN: f64 = 0.1;

/// Grace divisor when no offering is used.
const BARE_GRACE_DIVISOR: f64 = 4.8;
/// Penalty numerator when no offering is used, shrinking with level.
const BARE_LEVEL_PENALTY: f64 = 0.4;
/// Keeps the level-1 penalty denominator non-zero.
const BARE_LEVEL_OFFSET: f64 = 0.999;

/// Cap for boosted ("high") attempts: `min(base + 0.36, base * 3)`.
const HIGH_CAP_ADD: f64 = 0.36;
const HIGH_CAP_MUL: f64 = 3.0;
/// Cap for ordinary attempts: `min(base + 0.24, base * 2)`.
const NORMAL_CAP_ADD: f64 = 0.24;
const NORMAL_CAP_MUL: f64 = 2.0;

/// Chance model for the upgrade mechanic.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpgradeChance;

impl UpgradeChance {
    /// Grace adjustment by the item's zero grade: items born at a higher
    /// grade start further behind.
    #[inline]
    const fn grace_adjustment(zero_grade: u8) -> f64 {
        match zero_grade {
            0 => 1.0,
            1 => -1.0,
            _ => -2.0,
        }
    }
}

impl ChanceModel for UpgradeChance {
    fn mechanic(&self) -> Mechanic {
        Mechanic::Upgrade
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

        let zero_grade = catalog.zero_grade(&item.name)?;
        let grade = catalog.grade(&item.name, item.level)?;
        if grade > scroll.grade {
            return Ok(AttemptChance::IMPOSSIBLE);
        }

        let new_level = item.level + 1;
        let level = f64::from(new_level);
        let base = catalog
            .base_chance_table(Mechanic::Upgrade)
            .chance(zero_grade, new_level)?;

        let grace = (item.grace + Self::grace_adjustment(zero_grade)).clamp(0.0, level + 1.0);
        let grace = base * grace / level + grace / 1000.0;

        let mut probability = base;
        let mut high = false;
        let mut new_grace = item.grace;

        if scroll.grade > grade && new_level <= HIGH_SCROLL_MAX_LEVEL {
            probability = probability * HIGH_SCROLL_RATE + HIGH_SCROLL_BONUS;
            high = true;
            new_grace += HIGH_SCROLL_GRACE;
        }

        if let Some(offering) = attempt.offering {
            let gain = match OfferingRelation::of(offering.grade, grade) {
                OfferingRelation::FarAbove => {
                    probability = probability * FAR_ABOVE_RATE + grace * FAR_ABOVE_GRACE_WEIGHT;
                    high = true;
                    FAR_ABOVE_GRACE_GAIN
                }
                OfferingRelation::Above => {
                    probability = probability * ABOVE_RATE + grace * ABOVE_GRACE_WEIGHT;
                    high = true;
                    ABOVE_GRACE_GAIN
                }
                OfferingRelation::Equal => {
                    probability = probability * EQUAL_RATE + grace;
                    EQUAL_GRACE_GAIN
                }
                OfferingRelation::Below => {
                    probability = probability * BELOW_RATE + grace / BELOW_GRACE_DIVISOR;
                    BELOW_GRACE_GAIN
                }
                OfferingRelation::FarBelow => {
                    probability = probability * FAR_BELOW_RATE + grace / FAR_BELOW_GRACE_DIVISOR;
                    FAR_BELOW_GRACE_GAIN
                }
            };
            new_grace += gain;
        } else {
            let offset = level - BARE_LEVEL_OFFSET;
            probability +=
                (grace / BARE_GRACE_DIVISOR - BARE_LEVEL_PENALTY / (offset * offset)).max(0.0);
        }

        let cap = if high {
            (base + HIGH_CAP_ADD).min(base * HIGH_CAP_MUL)
        } else {
            (base + NORMAL_CAP_ADD).min(base * NORMAL_CAP_MUL)
        };
        probability = probability.min(cap);

        Ok(AttemptChance {
            chance: probability.clamp(0.0, 1.0),
            new_grace,
        })
    }
}
