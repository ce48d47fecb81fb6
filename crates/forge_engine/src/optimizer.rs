//! # Cost Optimizer
//!
//! Enumerates every allowed (scroll tier, offering tier, stack count)
//! combination for one attempt, evaluates each with the mechanic's chance
//! model, and keeps the best one for the configured objective.
//!
//! ## Enumeration Order
//!
//! ```text
//! for scroll   in grade ..= grade + 1       (tier >= 3 only if allowed)
//!   for offering in 0 ..= 3                  (tier 3 only if allowed)
//!     for stacks in 0 ..= ceil((level + 2 - grace) / 0.5)   (upgrades, if stacking)
//! ```
//!
//! A candidate replaces the incumbent only if it is strictly better, so the
//! first of several equal candidates wins. The order above is part of the
//! observable contract: it decides ties.

use forge_catalog::{CatalogLookup, ItemDefinition, Mechanic, MAX_OFFERING_TIER};
use serde::Serialize;

use crate::chance::{Attempt, AttemptChance, ChanceModel};
use crate::compound::CompoundChance;
use crate::config::{lucky_slot_chance, Objective, OptimizerConfig};
use crate::error::{EngineError, EngineResult};
use crate::state::ItemState;
use crate::upgrade::UpgradeChance;

/// Scroll tiers from this one up need `allow_tier3_scroll`.
const TIER3_SCROLL: u8 = 3;
/// Offering tier that needs `allow_tier3_offering`.
const TIER3_OFFERING: u8 = 3;
/// Offering tier sacrificed per grace stack.
const STACK_OFFERING: u8 = 1;
/// Grace added per sacrificed stack.
const GRACE_PER_STACK: f64 = 0.5;
/// Stacking stops paying once grace reaches `level + STACK_GRACE_HEADROOM`.
const STACK_GRACE_HEADROOM: f64 = 2.0;

/// The consumables chosen for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Selection {
    /// Scroll tier, 0-4.
    pub scroll_tier: u8,
    /// Offering tier, 0 for none.
    pub offering_tier: u8,
    /// Sacrificial stacks before the attempt. `None` for compounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacks: Option<u32>,
}

/// One evaluated point of the search space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// What is consumed.
    pub selection: Selection,
    /// Gold spent on a single attempt, including the item itself.
    pub attempt_cost: f64,
    /// Chance of the attempt, after the lucky-slot remap if enabled.
    pub chance: f64,
    /// Grace after the attempt.
    pub new_grace: f64,
}

impl Candidate {
    /// Expected gold per success. Infinite when the attempt cannot succeed.
    #[inline]
    #[must_use]
    pub fn expected_cost(&self) -> f64 {
        if self.chance > 0.0 {
            self.attempt_cost / self.chance
        } else {
            f64::INFINITY
        }
    }

    /// Whether this candidate strictly beats `incumbent` under `objective`.
    ///
    /// With no incumbent the bar is a finite expected cost (cost objective)
    /// or a non-zero chance (chance objective). Price plays no part in the
    /// chance objective, so the unobtainable tier-4 scroll can win there.
    #[must_use]
    pub fn beats(&self, incumbent: Option<&Self>, objective: Objective) -> bool {
        match objective {
            Objective::MinimizeCost => {
                if !self.attempt_cost.is_finite() {
                    return false;
                }
                let bar = incumbent.map_or(f64::INFINITY, Self::expected_cost);
                self.expected_cost() < bar
            }
            Objective::MaximizeChance => {
                let bar = incumbent.map_or(0.0, |best| best.chance);
                self.chance > bar
            }
        }
    }
}

/// The winning selection for one step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepPlan {
    /// Expected gold per success: the price of the item one level higher.
    pub expected_cost: f64,
    /// Single-attempt chance of the winning selection.
    pub chance: f64,
    /// Grace the item carries after the attempt.
    pub new_grace: f64,
    /// The winning consumables.
    pub selection: Selection,
}

impl From<Candidate> for StepPlan {
    fn from(candidate: Candidate) -> Self {
        Self {
            expected_cost: candidate.expected_cost(),
            chance: candidate.chance,
            new_grace: candidate.new_grace,
            selection: candidate.selection,
        }
    }
}

/// Single-step optimizer over a catalog.
#[derive(Debug)]
pub struct CostOptimizer<'c, C: ?Sized> {
    catalog: &'c C,
    config: OptimizerConfig,
}

impl<'c, C: CatalogLookup + ?Sized> CostOptimizer<'c, C> {
    /// Creates an optimizer.
    #[must_use]
    pub const fn new(catalog: &'c C, config: OptimizerConfig) -> Self {
        Self { catalog, config }
    }

    /// The catalog this optimizer reads.
    #[must_use]
    pub const fn catalog(&self) -> &'c C {
        self.catalog
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Best selection for the item's own mechanic.
    ///
    /// `starting_cost` is the gold already sunk into one copy of the item.
    ///
    /// # Errors
    ///
    /// Catalog errors, [`EngineError::MaxLevel`], or
    /// [`EngineError::NoFeasibleSelection`].
    pub fn best_step(&self, starting_cost: f64, item: &ItemState) -> EngineResult<StepPlan> {
        let candidates = self.candidates(starting_cost, item)?;
        self.select(item, &candidates)
    }

    /// Best upgrade selection.
    ///
    /// # Errors
    ///
    /// As [`CostOptimizer::best_step`], plus [`EngineError::WrongMechanic`]
    /// for a compound item.
    pub fn best_upgrade(&self, starting_cost: f64, item: &ItemState) -> EngineResult<StepPlan> {
        self.expect_mechanic(item, Mechanic::Upgrade)?;
        self.best_step(starting_cost, item)
    }

    /// Best compound selection.
    ///
    /// # Errors
    ///
    /// As [`CostOptimizer::best_step`], plus [`EngineError::WrongMechanic`]
    /// for an upgrade item.
    pub fn best_compound(&self, starting_cost: f64, item: &ItemState) -> EngineResult<StepPlan> {
        self.expect_mechanic(item, Mechanic::Compound)?;
        self.best_step(starting_cost, item)
    }

    /// Every enumerated candidate, in enumeration order.
    ///
    /// # Errors
    ///
    /// Catalog errors or [`EngineError::MaxLevel`].
    pub fn candidates(&self, starting_cost: f64, item: &ItemState) -> EngineResult<Vec<Candidate>> {
        let definition = self.catalog.item_definition(&item.name)?;
        if item.level >= definition.max_level() {
            return Err(EngineError::MaxLevel {
                item: item.name.clone(),
                level: item.level,
            });
        }
        match definition.mechanic {
            Mechanic::Upgrade => self.upgrade_candidates(definition, starting_cost, item),
            Mechanic::Compound => self.compound_candidates(definition, starting_cost, item),
        }
    }

    /// Picks the winner from `candidates` by strict improvement.
    fn select(&self, item: &ItemState, candidates: &[Candidate]) -> EngineResult<StepPlan> {
        let mut best: Option<&Candidate> = None;
        for candidate in candidates {
            if candidate.beats(best, self.config.objective) {
                best = Some(candidate);
            }
        }

        let best = best.ok_or_else(|| EngineError::NoFeasibleSelection {
            item: item.name.clone(),
            level: item.level,
        })?;

        tracing::debug!(
            "{} +{} -> +{}: scroll {} offering {} stacks {:?}, chance {:.4}, cost {:.0}",
            item.name,
            item.level,
            item.level + 1,
            best.selection.scroll_tier,
            best.selection.offering_tier,
            best.selection.stacks,
            best.chance,
            best.expected_cost()
        );

        Ok(StepPlan::from(*best))
    }

    fn expect_mechanic(&self, item: &ItemState, expected: Mechanic) -> EngineResult<()> {
        let definition = self.catalog.item_definition(&item.name)?;
        if definition.mechanic == expected {
            Ok(())
        } else {
            Err(EngineError::WrongMechanic {
                item: item.name.clone(),
                expected,
            })
        }
    }

    /// Scroll tiers worth trying: the item's grade and the one above.
    fn scroll_tiers(&self, grade: u8) -> impl Iterator<Item = u8> {
        let allow_tier3 = self.config.allow_tier3_scroll;
        (grade..=grade + 1).filter(move |&tier| tier < TIER3_SCROLL || allow_tier3)
    }

    /// Offering tiers worth trying, 0 meaning none.
    fn offering_tiers(&self) -> impl Iterator<Item = u8> {
        let allow_tier3 = self.config.allow_tier3_offering;
        (0..=MAX_OFFERING_TIER).filter(move |&tier| tier != TIER3_OFFERING || allow_tier3)
    }

    /// Highest stack count enumerated for `item`.
    fn max_stacks(&self, item: &ItemState) -> u32 {
        if !self.config.allow_grace_stacking {
            return 0;
        }
        let stacks =
            ((f64::from(item.level) + STACK_GRACE_HEADROOM - item.grace) / GRACE_PER_STACK).ceil();
        // Saturating float-to-int cast; negative headroom means no stacks.
        stacks.max(0.0) as u32
    }

    fn upgrade_candidates(
        &self,
        definition: &ItemDefinition,
        starting_cost: f64,
        item: &ItemState,
    ) -> EngineResult<Vec<Candidate>> {
        let model = UpgradeChance;
        let grade = definition.grade(item.level);
        let stack_price = self
            .catalog
            .offering_definition(STACK_OFFERING)?
            .map_or(0.0, |offering| offering.price);
        let max_stacks = self.max_stacks(item);

        let mut candidates = Vec::new();
        for scroll_tier in self.scroll_tiers(grade) {
            let scroll = self.catalog.scroll_definition(Mechanic::Upgrade, scroll_tier)?;
            let scroll_price = scroll.map_or(f64::INFINITY, |scroll| scroll.price);

            for offering_tier in self.offering_tiers() {
                let offering = self.catalog.offering_definition(offering_tier)?;
                let offering_price = offering.map_or(0.0, |offering| offering.price);

                for stacks in 0..=max_stacks {
                    let stacked = item.with_extra_grace(GRACE_PER_STACK * f64::from(stacks));
                    let outcome = model.evaluate(
                        self.catalog,
                        Attempt {
                            item: &stacked,
                            scroll,
                            offering,
                        },
                    )?;
                    // The remap lifts 0 above 0; an impossible attempt stays impossible.
                    let chance = if self.config.lucky_slot && outcome.is_feasible() {
                        lucky_slot_chance(outcome.chance)
                    } else {
                        outcome.chance
                    };

                    let candidate = Candidate {
                        selection: Selection {
                            scroll_tier,
                            offering_tier,
                            stacks: Some(stacks),
                        },
                        attempt_cost: starting_cost
                            + scroll_price
                            + offering_price
                            + stack_price * f64::from(stacks),
                        chance,
                        new_grace: outcome.new_grace,
                    };
                    Self::trace_candidate(item, &candidate);
                    candidates.push(candidate);
                }
            }
        }
        Ok(candidates)
    }

    fn compound_candidates(
        &self,
        definition: &ItemDefinition,
        starting_cost: f64,
        item: &ItemState,
    ) -> EngineResult<Vec<Candidate>> {
        let model = CompoundChance;
        let grade = definition.grade(item.level);
        let copies = f64::from(Mechanic::Compound.copies_per_attempt());

        let mut candidates = Vec::new();
        for scroll_tier in self.scroll_tiers(grade) {
            let scroll = self.catalog.scroll_definition(Mechanic::Compound, scroll_tier)?;
            let scroll_price = scroll.map_or(f64::INFINITY, |scroll| scroll.price);

            for offering_tier in self.offering_tiers() {
                let offering = self.catalog.offering_definition(offering_tier)?;
                let offering_price = offering.map_or(0.0, |offering| offering.price);

                let AttemptChance { chance, new_grace } = model.evaluate(
                    self.catalog,
                    Attempt {
                        item,
                        scroll,
                        offering,
                    },
                )?;

                let candidate = Candidate {
                    selection: Selection {
                        scroll_tier,
                        offering_tier,
                        stacks: None,
                    },
                    attempt_cost: starting_cost * copies + scroll_price + offering_price,
                    chance,
                    new_grace,
                };
                Self::trace_candidate(item, &candidate);
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }

    fn trace_candidate(item: &ItemState, candidate: &Candidate) {
        tracing::trace!(
            "{} +{}: {:?} chance {:.6} expected {:.0}",
            item.name,
            item.level,
            candidate.selection,
            candidate.chance,
            candidate.expected_cost()
        );
    }
}
