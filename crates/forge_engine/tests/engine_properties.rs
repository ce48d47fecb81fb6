//! # Engine Property Tests
//!
//! Randomized (but seeded) sweeps over item states of the bundled catalog,
//! checking the engine's invariants against exhaustive recomputation.
//!
//! Run with: cargo test --package forge_engine --test engine_properties

use forge_catalog::{Catalog, CatalogLookup, ItemDefinition, Mechanic};
use forge_engine::{
    Attempt, ChainPlanner, ChanceModel, CompoundChance, CostOptimizer, ItemState, Objective,
    OptimizerConfig, UpgradeChance,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SAMPLES: usize = 400;

fn sorted_items(catalog: &Catalog) -> Vec<ItemDefinition> {
    let mut items: Vec<ItemDefinition> = catalog.items().cloned().collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

fn random_config(rng: &mut ChaCha8Rng) -> OptimizerConfig {
    OptimizerConfig::default()
        .with_objective(if rng.gen_bool(0.5) {
            Objective::MinimizeCost
        } else {
            Objective::MaximizeChance
        })
        .with_tier3_scroll(rng.gen_bool(0.7))
        .with_tier3_offering(rng.gen_bool(0.3))
        .with_lucky_slot(rng.gen_bool(0.5))
        .with_grace_stacking(rng.gen_bool(0.5))
}

/// Random state strictly below the item's maximum level.
fn random_state(rng: &mut ChaCha8Rng, items: &[ItemDefinition]) -> (ItemState, f64) {
    let item = &items[rng.gen_range(0..items.len())];
    let level = rng.gen_range(0..item.max_level());
    let grace = f64::from(rng.gen_range(0..40u32)) * 0.25;
    let price = item.price * f64::from(rng.gen_range(1..50u32));
    (ItemState::new(item.name.clone(), level, grace), price)
}

// ============================================================================
// GRADES
// ============================================================================

#[test]
fn grade_is_monotonic_in_level() {
    let catalog = Catalog::builtin().unwrap();
    for item in sorted_items(&catalog) {
        let mut previous = 0;
        for level in 0..=item.max_level() + 3 {
            let grade = catalog.grade(&item.name, level).unwrap();
            assert!(grade >= previous, "{} grade fell at {level}", item.name);
            assert!(grade <= 3);
            previous = grade;
        }
    }
}

// ============================================================================
// CHANCE MODELS
// ============================================================================

#[test]
fn chance_models_stay_in_unit_interval() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(0xF0_46E);

    for _ in 0..SAMPLES {
        let (item, _) = random_state(&mut rng, &items);
        let mechanic = catalog.item_definition(&item.name).unwrap().mechanic;
        let scroll = catalog
            .scroll_definition(mechanic, rng.gen_range(0..=4))
            .unwrap();
        let offering = catalog.offering_definition(rng.gen_range(0..=3)).unwrap();
        let attempt = Attempt {
            item: &item,
            scroll,
            offering,
        };

        let outcome = match mechanic {
            Mechanic::Upgrade => UpgradeChance.evaluate(&catalog, attempt),
            Mechanic::Compound => CompoundChance.evaluate(&catalog, attempt),
        }
        .unwrap();

        assert!(
            (0.0..=1.0).contains(&outcome.chance),
            "{item:?} produced chance {}",
            outcome.chance
        );
        assert!(outcome.new_grace >= 0.0);
    }
}

#[test]
fn scroll_below_item_grade_is_exactly_zero() {
    let catalog = Catalog::builtin().unwrap();
    for item in sorted_items(&catalog) {
        for level in 0..item.max_level() {
            let grade = item.grade(level);
            let state = ItemState::new(item.name.clone(), level, 1.0);
            for tier in 0..grade {
                let attempt = Attempt {
                    item: &state,
                    scroll: catalog.scroll_definition(item.mechanic, tier).unwrap(),
                    offering: None,
                };
                let outcome = match item.mechanic {
                    Mechanic::Upgrade => UpgradeChance.evaluate(&catalog, attempt),
                    Mechanic::Compound => CompoundChance.evaluate(&catalog, attempt),
                }
                .unwrap();
                assert_eq!(outcome.chance, 0.0);
            }
        }
    }
}

// ============================================================================
// OPTIMIZER
// ============================================================================

#[test]
fn cost_optimizer_is_true_minimum() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..SAMPLES {
        let (item, price) = random_state(&mut rng, &items);
        let config = random_config(&mut rng)
            .with_objective(Objective::MinimizeCost)
            .with_tier3_scroll(true);
        let optimizer = CostOptimizer::new(&catalog, config);

        let candidates = optimizer.candidates(price, &item).unwrap();
        let plan = optimizer.best_step(price, &item).unwrap();

        for candidate in &candidates {
            assert!(
                plan.expected_cost <= candidate.expected_cost(),
                "{item:?}: winner {:?} at {} beaten by {:?} at {}",
                plan.selection,
                plan.expected_cost,
                candidate.selection,
                candidate.expected_cost()
            );
        }
    }
}

#[test]
fn ties_go_to_the_smallest_selection() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for _ in 0..SAMPLES {
        let (item, price) = random_state(&mut rng, &items);
        let config = random_config(&mut rng).with_tier3_scroll(true);
        let objective = config.objective;
        let optimizer = CostOptimizer::new(&catalog, config);

        let candidates = optimizer.candidates(price, &item).unwrap();
        let plan = optimizer.best_step(price, &item).unwrap();

        let score = |chance: f64, cost: f64| match objective {
            Objective::MinimizeCost => cost,
            Objective::MaximizeChance => -chance,
        };
        let winning_score = score(plan.chance, plan.expected_cost);
        let first_equal = candidates
            .iter()
            .find(|c| score(c.chance, c.expected_cost()) == winning_score)
            .unwrap();

        assert_eq!(first_equal.selection, plan.selection);
        // Enumeration order is lexicographic, so the first equal one is the smallest
        assert!(candidates
            .iter()
            .filter(|c| score(c.chance, c.expected_cost()) == winning_score)
            .all(|c| c.selection >= plan.selection));
    }
}

#[test]
fn candidates_are_enumerated_in_lexicographic_order() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(13);

    for _ in 0..SAMPLES {
        let (item, price) = random_state(&mut rng, &items);
        let optimizer = CostOptimizer::new(&catalog, random_config(&mut rng));
        let candidates = optimizer.candidates(price, &item).unwrap();
        assert!(candidates
            .windows(2)
            .all(|pair| pair[0].selection < pair[1].selection));
    }
}

#[test]
fn infeasible_scroll_never_wins() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(17);

    for _ in 0..SAMPLES {
        let (item, price) = random_state(&mut rng, &items);
        let config = random_config(&mut rng).with_tier3_scroll(true);
        let objective = config.objective;
        let optimizer = CostOptimizer::new(&catalog, config);
        let plan = optimizer.best_step(price, &item).unwrap();
        assert!(plan.chance > 0.0);
        // Only the chance objective may pick the unobtainable tier-4 scroll
        if objective == Objective::MinimizeCost {
            assert!(plan.expected_cost.is_finite());
        }
    }
}

#[test]
fn lucky_slot_never_lowers_chance() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(19);

    for _ in 0..SAMPLES {
        let (item, price) = random_state(&mut rng, &items);
        let config = random_config(&mut rng);
        let plain = CostOptimizer::new(&catalog, config.clone().with_lucky_slot(false))
            .candidates(price, &item)
            .unwrap();
        let lucky = CostOptimizer::new(&catalog, config.with_lucky_slot(true))
            .candidates(price, &item)
            .unwrap();

        assert_eq!(plain.len(), lucky.len());
        for (plain, lucky) in plain.iter().zip(&lucky) {
            assert_eq!(plain.selection, lucky.selection);
            assert!(lucky.chance >= plain.chance);
        }
    }
}

#[test]
fn fresh_pinkie_example() {
    let catalog = Catalog::builtin().unwrap();
    let price = catalog.item_definition("pinkie").unwrap().price;
    let config = OptimizerConfig::default()
        .with_objective(Objective::MinimizeCost)
        .with_grace_stacking(false)
        .with_tier3_scroll(false)
        .with_tier3_offering(false)
        .with_lucky_slot(false);

    let plan = CostOptimizer::new(&catalog, config)
        .best_upgrade(price, &ItemState::fresh("pinkie"))
        .unwrap();

    assert!(plan.selection.scroll_tier <= 1);
    assert!(plan.selection.offering_tier <= 2);
    assert!(plan.chance > 0.0 && plan.chance <= 1.0);
    assert!(plan.expected_cost >= price);
}

#[test]
fn optimizer_is_deterministic() {
    let catalog = Catalog::builtin().unwrap();
    let optimizer = CostOptimizer::new(&catalog, OptimizerConfig::default());
    let item = ItemState::new("blade", 4, 2.5);
    let first = optimizer.best_step(95_000.0, &item).unwrap();
    for _ in 0..10 {
        assert_eq!(optimizer.best_step(95_000.0, &item).unwrap(), first);
    }
}

// ============================================================================
// CHAIN PLANNER
// ============================================================================

#[test]
fn chain_length_and_levels_match_range() {
    let catalog = Catalog::builtin().unwrap();
    let items = sorted_items(&catalog);
    let mut rng = ChaCha8Rng::seed_from_u64(23);

    for _ in 0..60 {
        let (item, price) = random_state(&mut rng, &items);
        let config = random_config(&mut rng).with_tier3_scroll(true);
        let max_level = catalog.item_definition(&item.name).unwrap().max_level();

        let history = ChainPlanner::new(&catalog, config).plan(&item, price).unwrap();

        assert_eq!(
            u32::try_from(history.len()).unwrap(),
            max_level - item.level
        );
        let levels: Vec<u32> = history.iter().map(|(level, _)| level).collect();
        let expected: Vec<u32> = (item.level + 1..=max_level).collect();
        assert_eq!(levels, expected);
    }
}

#[test]
fn chain_history_serializes_by_level() {
    let catalog = Catalog::builtin().unwrap();
    let planner = ChainPlanner::new(&catalog, OptimizerConfig::default().with_tier3_scroll(true));
    let history = planner.plan(&ItemState::new("pinkie", 9, 0.0), 1_000_000.0).unwrap();

    let json = serde_json::to_value(&history).unwrap();
    let steps = json["steps"].as_object().unwrap();
    assert_eq!(steps.len(), 3);
    for level in ["10", "11", "12"] {
        let step = &steps[level];
        assert!(step["new_price"].is_number());
        assert!(step["resulting_chance"].is_number());
        assert!(step["resulting_grace"].is_number());
        assert!(step["scroll"].is_number());
        assert!(step["offering"].is_number());
        assert!(step["stacks"].is_number());
    }
}

#[test]
fn compound_history_omits_stacks() {
    let catalog = Catalog::builtin().unwrap();
    let planner = ChainPlanner::new(&catalog, OptimizerConfig::default().with_tier3_scroll(true));
    let history = planner.plan(&ItemState::fresh("orbg"), 5_000_000.0).unwrap();

    let json = serde_json::to_value(&history).unwrap();
    for step in json["steps"].as_object().unwrap().values() {
        assert!(step.get("stacks").is_none());
    }
}
