//! Settings file and command-line optimizer flags.
//!
//! ```toml
//! [optimizer]
//! objective = "maximize_chance"
//! allow_tier3_scroll = true
//! lucky_slot = true
//! ```
//!
//! Flags are applied on top of the file: a flag can only switch its option
//! away from the default, never back.

use std::path::{Path, PathBuf};

use clap::Args;
use forge_engine::{Objective, OptimizerConfig};
use serde::Deserialize;

use crate::error::{CliError, CliResult};

/// Contents of a settings file. Every table is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Optimizer options.
    pub optimizer: OptimizerConfig,
}

impl Settings {
    /// Reads a settings file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&text, path)?;
        tracing::info!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    fn parse(text: &str, path: &Path) -> CliResult<Self> {
        toml::from_str(text).map_err(|source| CliError::Settings {
            path: PathBuf::from(path),
            source,
        })
    }
}

/// Optimizer switches shared by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct OptimizerFlags {
    /// Pick the highest single-attempt chance instead of the cheapest
    #[arg(long)]
    pub max_chance: bool,

    /// Allow tier-3 and higher scrolls
    #[arg(long)]
    pub scroll3: bool,

    /// Forbid tier-3 and higher scrolls, even where they are the default
    #[arg(long, conflicts_with = "scroll3")]
    pub no_scroll3: bool,

    /// Allow the tier-3 offering
    #[arg(long)]
    pub offeringx: bool,

    /// Apply the lucky-slot chance bonus (upgrades only)
    #[arg(long)]
    pub lucky_slot: bool,

    /// Never sacrifice offerings for extra grace
    #[arg(long)]
    pub no_stacking: bool,
}

impl OptimizerFlags {
    /// Applies the flags that are set to `config`.
    #[must_use]
    pub fn apply(&self, mut config: OptimizerConfig) -> OptimizerConfig {
        if self.max_chance {
            config.objective = Objective::MaximizeChance;
        }
        config.allow_tier3_scroll |= self.scroll3;
        if self.no_scroll3 {
            config.allow_tier3_scroll = false;
        }
        config.allow_tier3_offering |= self.offeringx;
        config.lucky_slot |= self.lucky_slot;
        if self.no_stacking {
            config.allow_grace_stacking = false;
        }
        config
    }
}
