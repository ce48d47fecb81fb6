//! # FORGE Engine
//!
//! Item-enhancement economics: which scroll, offering and grace stack to
//! use for the next attempt, and what an item costs by the time it reaches
//! its maximum level.
//!
//! ## Design Principles
//!
//! 1. **Pure** - No I/O, no clocks, no randomness; identical inputs give
//!    identical outputs
//! 2. **Catalog through a trait** - All game data comes from
//!    [`forge_catalog::CatalogLookup`]
//! 3. **Deterministic ties** - Enumeration order decides equal candidates
//! 4. **Greedy chains** - Each level is optimized on its own, in order
//!
//! ## Components
//!
//! ```text
//! grade::classify (forge_catalog)
//!        │
//!        ├──> UpgradeChance ──┐
//!        └──> CompoundChance ─┴──> CostOptimizer ──> ChainPlanner
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use forge_catalog::Catalog;
//! use forge_engine::{ChainPlanner, ItemState, OptimizerConfig};
//!
//! let catalog = Catalog::builtin()?;
//! let planner = ChainPlanner::new(&catalog, OptimizerConfig::default().with_tier3_scroll(true));
//! let history = planner.plan(&ItemState::fresh("pinkie"), 24_000.0)?;
//! println!("+12 pinkie costs {:.0} gold", history.final_price());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chance;
pub mod compound;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod planner;
pub mod state;
pub mod upgrade;

pub use chance::{Attempt, AttemptChance, ChanceModel, OfferingRelation};
pub use compound::CompoundChance;
pub use config::{lucky_slot_chance, Objective, OptimizerConfig};
pub use error::{EngineError, EngineResult};
pub use optimizer::{Candidate, CostOptimizer, Selection, StepPlan};
pub use planner::{ChainHistory, ChainPlanner, StepRecord};
pub use state::ItemState;
pub use upgrade::UpgradeChance;
