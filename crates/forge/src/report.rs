//! Human-readable and JSON renderings of optimizer results.

use std::fmt;

use forge_engine::{ChainHistory, ItemState, StepPlan};
use serde::Serialize;

const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════";

/// JSON shape of `forge step`.
#[derive(Debug, Serialize)]
pub struct StepReport<'a> {
    /// Item the step was planned for.
    pub item: &'a ItemState,
    /// Price of the item before the attempt.
    pub price: f64,
    /// The winning plan.
    pub plan: &'a StepPlan,
}

impl fmt::Display for StepReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selection = &self.plan.selection;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "  FORGE STEP: {} +{} -> +{}",
            self.item.name,
            self.item.level,
            self.item.level + 1
        )?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Start price:    {:>16.0}", self.price)?;
        writeln!(f, "  Start grace:    {:>16.2}", self.item.grace)?;
        writeln!(f)?;
        writeln!(f, "  Scroll tier:    {:>16}", selection.scroll_tier)?;
        writeln!(f, "  Offering tier:  {:>16}", tier_or_dash(selection.offering_tier))?;
        writeln!(f, "  Stacks:         {:>16}", stacks_or_dash(selection.stacks))?;
        writeln!(f)?;
        writeln!(f, "  Chance:         {:>15.4}%", self.plan.chance * 100.0)?;
        writeln!(f, "  Grace after:    {:>16.2}", self.plan.new_grace)?;
        writeln!(f, "  Expected cost:  {:>16.0}", self.plan.expected_cost)?;
        write!(f, "{RULE}")
    }
}

/// Table rendering of a full chain.
#[derive(Debug)]
pub struct ChainTable<'a>(pub &'a ChainHistory);

impl fmt::Display for ChainTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = self.0;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "  FORGE CHAIN: {} ({}) from +{} at {:.0}",
            history.item, history.mechanic, history.start_level, history.start_price
        )?;
        writeln!(f, "{RULE}")?;

        if history.is_empty() {
            writeln!(f, "  Already at maximum level.")?;
            return write!(f, "{RULE}");
        }

        writeln!(
            f,
            "  {:<7} {:>6} {:>8} {:>6} {:>10} {:>8} {:>20}",
            "Level", "Scroll", "Offering", "Stacks", "Chance", "Grace", "Price"
        )?;
        for (level, step) in history.iter() {
            writeln!(
                f,
                "  +{:<6} {:>6} {:>8} {:>6} {:>9.4}% {:>8.2} {:>20.0}",
                level,
                step.scroll,
                tier_or_dash(step.offering),
                stacks_or_dash(step.stacks),
                step.resulting_chance * 100.0,
                step.resulting_grace,
                step.new_price
            )?;
        }
        writeln!(f, "{RULE}")?;
        writeln!(f, "  Final price: {:.0}", history.final_price())?;
        write!(f, "{RULE}")
    }
}

fn tier_or_dash(tier: u8) -> String {
    if tier == 0 {
        "-".to_owned()
    } else {
        tier.to_string()
    }
}

fn stacks_or_dash(stacks: Option<u32>) -> String {
    stacks.map_or_else(|| "-".to_owned(), |stacks| stacks.to_string())
}
