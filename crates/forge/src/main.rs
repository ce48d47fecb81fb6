//! # FORGE
//!
//! Command-line front end for the enhancement cost engine.
//!
//! ```bash
//! # Cheapest way to take a fresh pinkie all the way up
//! forge chain pinkie
//!
//! # Best consumables for the next attempt only, as JSON
//! forge step blade --level 7 --grace 2.5 --price 3000000 --json
//!
//! # Custom catalog and settings, verbose engine logs
//! forge --catalog data/catalog.toml --settings forge.toml --log-level debug chain intring
//! ```
//!
//! Logs go to stderr; results go to stdout.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod report;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use forge_catalog::{Catalog, CatalogLookup};
use forge_engine::{ChainPlanner, CostOptimizer, ItemState, OptimizerConfig};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};
use crate::report::{ChainTable, StepReport};
use crate::settings::{OptimizerFlags, Settings};

/// Enhancement cost calculator
#[derive(Parser, Debug)]
#[command(name = "forge", version)]
#[command(about = "Find the cheapest scroll and offering choices for upgrades and compounds")]
struct Cli {
    /// Catalog TOML file (defaults to the bundled catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Settings TOML file with an [optimizer] table
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "forge_engine=trace" (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan every step up to the item's maximum level
    Chain(Target),
    /// Plan only the next attempt
    Step(Target),
}

/// The item to plan for and how to plan it.
#[derive(Args, Debug)]
struct Target {
    /// Catalog name of the item
    item: String,

    /// Gold already sunk into one copy (defaults to the catalog price)
    #[arg(long)]
    price: Option<f64>,

    /// Current level
    #[arg(long, default_value_t = 0)]
    level: u32,

    /// Current grace
    #[arg(long, default_value_t = 0.0)]
    grace: f64,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    optimizer: OptimizerFlags,
}

impl Target {
    /// Validates the target against the catalog and returns the starting
    /// state and price.
    fn resolve<C: CatalogLookup + ?Sized>(&self, catalog: &C) -> CliResult<(ItemState, f64)> {
        let definition = catalog.item_definition(&self.item)?;

        let price = self.price.unwrap_or(definition.price);
        if !price.is_finite() || price < 0.0 {
            return Err(CliError::InvalidInput(format!(
                "price must be a non-negative number, got {price}"
            )));
        }
        if !self.grace.is_finite() || self.grace < 0.0 {
            return Err(CliError::InvalidInput(format!(
                "grace must be a non-negative number, got {}",
                self.grace
            )));
        }
        if self.level >= definition.max_level() {
            return Err(CliError::InvalidInput(format!(
                "{} is already at or past its maximum level +{}",
                self.item,
                definition.max_level()
            )));
        }

        Ok((ItemState::new(self.item.clone(), self.level, self.grace), price))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber. `--log-level` wins over `RUST_LOG`,
/// which wins over the `info` default.
fn init_tracing(level: Option<&str>) {
    let filter = level
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the parsed command and returns what should be printed.
fn run(cli: &Cli) -> CliResult<String> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    let settings = Settings::load(cli.settings.as_deref())?;

    match &cli.command {
        Command::Chain(target) => {
            // Past grades[2] only tier-3 scrolls can act, so chains allow them
            // unless --no-scroll3 is given.
            let defaults = settings.optimizer.with_tier3_scroll(true);
            let config = target.optimizer.apply(defaults);
            chain(&catalog, config, target)
        }
        Command::Step(target) => {
            let config = target.optimizer.apply(settings.optimizer);
            step(&catalog, config, target)
        }
    }
}

fn chain(catalog: &Catalog, config: OptimizerConfig, target: &Target) -> CliResult<String> {
    let (item, price) = target.resolve(catalog)?;
    let history = ChainPlanner::new(catalog, config).plan(&item, price)?;

    if target.json {
        Ok(serde_json::to_string_pretty(&history)?)
    } else {
        Ok(ChainTable(&history).to_string())
    }
}

fn step(catalog: &Catalog, config: OptimizerConfig, target: &Target) -> CliResult<String> {
    let (item, price) = target.resolve(catalog)?;
    let plan = CostOptimizer::new(catalog, config).best_step(price, &item)?;
    let report = StepReport {
        item: &item,
        price,
        plan: &plan,
    };

    if target.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use forge_engine::{EngineError, Objective};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("forge").chain(args.iter().copied())).unwrap()
    }

    fn target(cli: &Cli) -> &Target {
        match &cli.command {
            Command::Chain(target) | Command::Step(target) => target,
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_chain_with_flags() {
        let cli = parse(&[
            "chain",
            "pinkie",
            "--level",
            "3",
            "--grace",
            "1.5",
            "--scroll3",
            "--max-chance",
            "--no-stacking",
        ]);
        assert!(matches!(cli.command, Command::Chain(_)));
        let target = target(&cli);
        assert_eq!(target.item, "pinkie");
        assert_eq!(target.level, 3);
        assert!((target.grace - 1.5).abs() < f64::EPSILON);

        let config = target.optimizer.apply(OptimizerConfig::default());
        assert_eq!(config.objective, Objective::MaximizeChance);
        assert!(config.allow_tier3_scroll);
        assert!(!config.allow_grace_stacking);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = parse(&["step", "blade", "--log-level", "debug", "--json"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(target(&cli).json);
    }

    #[test]
    fn test_non_numeric_level_rejected_by_parser() {
        let result = Cli::try_parse_from(["forge", "step", "pinkie", "--level", "high"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_price_defaults_to_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let cli = parse(&["step", "pinkie"]);
        let (item, price) = target(&cli).resolve(&catalog).unwrap();
        assert_eq!(item, ItemState::fresh("pinkie"));
        assert!((price - 24_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_inputs() {
        let catalog = Catalog::builtin().unwrap();
        let cases: [&[&str]; 4] = [
            &["step", "pinkie", "--price=-5"],
            &["step", "pinkie", "--price", "inf"],
            &["step", "pinkie", "--grace=-1"],
            &["step", "pinkie", "--level", "12"],
        ];
        for args in cases {
            let cli = parse(args);
            assert!(
                matches!(target(&cli).resolve(&catalog), Err(CliError::InvalidInput(_))),
                "{args:?} accepted"
            );
        }
    }

    #[test]
    fn test_unknown_item() {
        let cli = parse(&["chain", "excalibur"]);
        assert!(matches!(run(&cli), Err(CliError::Catalog(_))));
    }

    #[test]
    fn test_step_json_output() {
        let cli = parse(&["step", "intring", "--level", "2", "--json"]);
        let output = run(&cli).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["item"]["level"], 2);
        assert!(json["plan"]["expected_cost"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_chain_table_output() {
        let cli = parse(&["chain", "pinkie"]);
        let output = run(&cli).unwrap();
        assert!(output.contains("FORGE CHAIN: pinkie (upgrade)"));
        assert!(output.contains("+12"));
    }

    #[test]
    fn test_default_chain_reaches_max_level() {
        let catalog = Catalog::builtin().unwrap();
        for item in ["pinkie", "blade"] {
            let cli = parse(&["chain", item, "--json"]);
            let output = run(&cli).unwrap();
            let json: serde_json::Value = serde_json::from_str(&output).unwrap();
            let max_level = catalog.item_definition(item).unwrap().max_level();
            assert!(
                json["steps"][max_level.to_string()].is_object(),
                "{item} stopped short of +{max_level}: {output}"
            );
        }
    }

    #[test]
    fn test_chain_without_tier3_reports_infeasible_step() {
        let cli = parse(&["chain", "pinkie", "--no-scroll3"]);
        assert!(matches!(
            run(&cli),
            Err(CliError::Engine(EngineError::NoFeasibleSelection { level: 10, .. }))
        ));
    }

    #[test]
    fn test_scroll3_flags_conflict() {
        let result =
            Cli::try_parse_from(["forge", "chain", "pinkie", "--scroll3", "--no-scroll3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_step_keeps_tier3_off_by_default() {
        let cli = parse(&["step", "pinkie", "--level", "10"]);
        assert!(matches!(
            run(&cli),
            Err(CliError::Engine(EngineError::NoFeasibleSelection { level: 10, .. }))
        ));
    }
}
