//! # Chain Planner
//!
//! Projects the cost of taking an item from its current level to its
//! catalog maximum by calling the optimizer once per level and committing
//! each winner before planning the next step.
//!
//! This is a greedy forward chain: every step optimizes only the next
//! transition, from the state the previous winner produced. There is no
//! lookahead and no backtracking, and changing that would change every
//! projected price.

use std::collections::BTreeMap;

use forge_catalog::{CatalogLookup, Mechanic};
use serde::Serialize;

use crate::config::OptimizerConfig;
use crate::error::{EngineError, EngineResult};
use crate::optimizer::{CostOptimizer, StepPlan};
use crate::state::ItemState;

/// One row of a chain: how the item reached a level and what it is worth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StepRecord {
    /// Expected gold sunk into one item at this level.
    pub new_price: f64,
    /// Chance of the attempt that reached this level.
    pub resulting_chance: f64,
    /// Grace carried at this level.
    pub resulting_grace: f64,
    /// Scroll tier used.
    pub scroll: u8,
    /// Offering tier used, 0 for none.
    pub offering: u8,
    /// Sacrificial stacks used (upgrades only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacks: Option<u32>,
}

impl From<&StepPlan> for StepRecord {
    fn from(plan: &StepPlan) -> Self {
        Self {
            new_price: plan.expected_cost,
            resulting_chance: plan.chance,
            resulting_grace: plan.new_grace,
            scroll: plan.selection.scroll_tier,
            offering: plan.selection.offering_tier,
            stacks: plan.selection.stacks,
        }
    }
}

/// Full projection from a starting level to the item's maximum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainHistory {
    /// Item name.
    pub item: String,
    /// Mechanic used at every step.
    pub mechanic: Mechanic,
    /// Level the chain started from.
    pub start_level: u32,
    /// Price of the item at the starting level.
    pub start_price: f64,
    /// One row per level reached, keyed by that level.
    pub steps: BTreeMap<u32, StepRecord>,
}

impl ChainHistory {
    /// Number of levels planned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the item was already at its maximum.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Row for the step that reached `level`.
    #[must_use]
    pub fn step(&self, level: u32) -> Option<&StepRecord> {
        self.steps.get(&level)
    }

    /// Projected price at the final level, or the start price for an empty chain.
    #[must_use]
    pub fn final_price(&self) -> f64 {
        self.steps
            .values()
            .next_back()
            .map_or(self.start_price, |step| step.new_price)
    }

    /// Rows in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &StepRecord)> {
        self.steps.iter().map(|(level, step)| (*level, step))
    }
}

/// Greedy level-by-level planner.
#[derive(Debug)]
pub struct ChainPlanner<'c, C: ?Sized> {
    optimizer: CostOptimizer<'c, C>,
}

impl<'c, C: CatalogLookup + ?Sized> ChainPlanner<'c, C> {
    /// Creates a planner with its own optimizer.
    #[must_use]
    pub const fn new(catalog: &'c C, config: OptimizerConfig) -> Self {
        Self {
            optimizer: CostOptimizer::new(catalog, config),
        }
    }

    /// Wraps an existing optimizer.
    #[must_use]
    pub const fn with_optimizer(optimizer: CostOptimizer<'c, C>) -> Self {
        Self { optimizer }
    }

    /// The optimizer used for each step.
    #[must_use]
    pub const fn optimizer(&self) -> &CostOptimizer<'c, C> {
        &self.optimizer
    }

    /// Plans every step from `item` to its maximum level.
    ///
    /// `price` is the gold already sunk into one copy of `item`.
    ///
    /// # Errors
    ///
    /// Catalog errors, or [`EngineError::NoFeasibleSelection`] when some level
    /// cannot be passed with the configured consumables.
    pub fn plan(&self, item: &ItemState, price: f64) -> EngineResult<ChainHistory> {
        let definition = self.optimizer.catalog().item_definition(&item.name)?;
        let max_level = definition.max_level();

        let mut state = item.clone();
        let mut price_now = price;
        let mut steps = BTreeMap::new();

        while state.level < max_level {
            let plan = match self.optimizer.best_step(price_now, &state) {
                Ok(plan) => plan,
                Err(err @ EngineError::NoFeasibleSelection { .. }) => {
                    tracing::warn!("Chain for {} stopped: {}", item.name, err);
                    return Err(err);
                }
                Err(err) => return Err(err),
            };

            state.grace = plan.new_grace;
            state.level += 1;
            price_now = plan.expected_cost;
            steps.insert(state.level, StepRecord::from(&plan));
        }

        tracing::info!(
            "Planned {} +{} -> +{}: {} steps, final price {:.0}",
            item.name,
            item.level,
            max_level,
            steps.len(),
            price_now
        );

        Ok(ChainHistory {
            item: item.name.clone(),
            mechanic: definition.mechanic,
            start_level: item.level,
            start_price: price,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_catalog::Catalog;

    fn planner(catalog: &Catalog) -> ChainPlanner<'_, Catalog> {
        ChainPlanner::new(catalog, OptimizerConfig::default().with_tier3_scroll(true))
    }

    #[test]
    fn test_chain_covers_every_level() {
        let catalog = Catalog::builtin().unwrap();
        let price = catalog.item_definition("pinkie").unwrap().price;
        let history = planner(&catalog)
            .plan(&ItemState::fresh("pinkie"), price)
            .unwrap();

        assert_eq!(history.len(), 12);
        let levels: Vec<u32> = history.iter().map(|(level, _)| level).collect();
        assert_eq!(levels, (1..=12).collect::<Vec<_>>());
        assert_eq!(history.mechanic, Mechanic::Upgrade);
    }

    #[test]
    fn test_chain_from_midway() {
        let catalog = Catalog::builtin().unwrap();
        let history = planner(&catalog)
            .plan(&ItemState::new("blade", 5, 1.5), 2_000_000.0)
            .unwrap();
        assert_eq!(history.len(), 7);
        assert_eq!(history.steps.keys().next(), Some(&6));
        assert_eq!(history.start_level, 5);
    }

    #[test]
    fn test_chain_prices_never_fall() {
        let catalog = Catalog::builtin().unwrap();
        let history = planner(&catalog)
            .plan(&ItemState::fresh("wingedboots"), 2_400_000.0)
            .unwrap();

        let mut previous = history.start_price;
        for (level, step) in history.iter() {
            assert!(
                step.new_price >= previous,
                "price fell at +{level}: {} < {previous}",
                step.new_price
            );
            previous = step.new_price;
        }
        assert!((history.final_price() - previous).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chain_matches_manual_greedy_steps() {
        let catalog = Catalog::builtin().unwrap();
        let planner = planner(&catalog);
        let history = planner.plan(&ItemState::fresh("pinkie"), 24_000.0).unwrap();

        let mut state = ItemState::fresh("pinkie");
        let mut price = 24_000.0;
        for (level, step) in history.iter() {
            let plan = planner.optimizer().best_step(price, &state).unwrap();
            assert_eq!(StepRecord::from(&plan), *step, "mismatch at +{level}");
            state.level += 1;
            state.grace = plan.new_grace;
            price = plan.expected_cost;
        }
    }

    #[test]
    fn test_compound_chain() {
        let catalog = Catalog::builtin().unwrap();
        let history = planner(&catalog)
            .plan(&ItemState::fresh("intring"), 30_000.0)
            .unwrap();
        assert_eq!(history.len(), 10);
        assert_eq!(history.mechanic, Mechanic::Compound);
        assert!(history.iter().all(|(_, step)| step.stacks.is_none()));
        // Each compound consumes three copies
        let first = history.step(1).unwrap();
        assert!(first.new_price >= 3.0 * 30_000.0);
    }

    #[test]
    fn test_chain_at_max_level_is_empty() {
        let catalog = Catalog::builtin().unwrap();
        let history = planner(&catalog)
            .plan(&ItemState::new("staff", 10, 0.0), 5000.0)
            .unwrap();
        assert!(history.is_empty());
        assert!((history.final_price() - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chain_stops_without_tier3_scrolls() {
        let catalog = Catalog::builtin().unwrap();
        let planner = ChainPlanner::new(&catalog, OptimizerConfig::default());
        assert!(matches!(
            planner.plan(&ItemState::fresh("pinkie"), 24_000.0),
            Err(EngineError::NoFeasibleSelection { level: 10, .. })
        ));
    }

    #[test]
    fn test_unknown_item() {
        let catalog = Catalog::builtin().unwrap();
        assert!(matches!(
            planner(&catalog).plan(&ItemState::fresh("excalibur"), 1.0),
            Err(EngineError::Catalog(_))
        ));
    }
}
