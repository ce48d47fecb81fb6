//! # Optimizer Configuration
//!
//! Every flag here changes which candidates the optimizer enumerates or how
//! a candidate's chance is post-adjusted. Deserializable so it can live in a
//! `[optimizer]` table of a settings file.

use serde::{Deserialize, Serialize};

/// What the optimizer ranks candidates by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Lowest expected gold per success (`cost / chance`).
    #[default]
    MinimizeCost,
    /// Highest single-attempt chance, i.e. fewest items consumed.
    MaximizeChance,
}

/// Candidate-space and adjustment flags for the optimizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Ranking objective.
    pub objective: Objective,
    /// Whether scroll tiers 3 and above may be used.
    pub allow_tier3_scroll: bool,
    /// Whether the tier-3 offering may be used.
    pub allow_tier3_offering: bool,
    /// Whether the lucky-slot chance remap applies (upgrades only).
    pub lucky_slot: bool,
    /// Whether sacrificial grace stacking is enumerated (upgrades only).
    pub allow_grace_stacking: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            objective: Objective::MinimizeCost,
            allow_tier3_scroll: false,
            allow_tier3_offering: false,
            lucky_slot: false,
            allow_grace_stacking: true,
        }
    }
}

impl OptimizerConfig {
    /// Sets the objective.
    #[must_use]
    pub const fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    /// Enables or disables tier-3+ scrolls.
    #[must_use]
    pub const fn with_tier3_scroll(mut self, allow: bool) -> Self {
        self.allow_tier3_scroll = allow;
        self
    }

    /// Enables or disables the tier-3 offering.
    #[must_use]
    pub const fn with_tier3_offering(mut self, allow: bool) -> Self {
        self.allow_tier3_offering = allow;
        self
    }

    /// Enables or disables the lucky slot.
    #[must_use]
    pub const fn with_lucky_slot(mut self, lucky: bool) -> Self {
        self.lucky_slot = lucky;
        self
    }

    /// Enables or disables grace stacking.
    #[must_use]
    pub const fn with_grace_stacking(mut self, allow: bool) -> Self {
        self.allow_grace_stacking = allow;
        self
    }

    /// Whether the optimizer minimizes items consumed rather than gold.
    #[inline]
    #[must_use]
    pub const fn optimize_for_item_count(&self) -> bool {
        matches!(self.objective, Objective::MaximizeChance)
    }
}

/// Lucky-slot remap of a single-attempt chance.
///
/// Never lowers a chance in `[0, 1]`.
#[inline]
#[must_use]
pub fn lucky_slot_chance(chance: f64) -> f64 {
    0.6 * ((chance + 0.012) / 0.975).min(1.0) + 0.4 * chance
}
