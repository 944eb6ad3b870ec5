use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::assess::{RiskConfig, RiskWeights, TierThresholds};

pub const DEFAULT_TOP_N: usize = 3;

/// Scoring and reporting knobs shared by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSettings {
    pub weights: RiskWeights,
    pub thresholds: TierThresholds,
    /// Number of hotspots listed in the brief.
    pub top_n: usize,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            thresholds: TierThresholds::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl RiskSettings {
    pub const ENV_PREFIX: &'static str = "SUPPLY_RISK";
    pub const ENV_SEPARATOR: &'static str = "__";

    /// Layer built-in defaults, an optional config file, then environment variables.
    ///
    /// * `--config <FILE>` — TOML, YAML or JSON, picked by extension.
    /// * `SUPPLY_RISK__TOP_N`, `SUPPLY_RISK__WEIGHTS__GEO`, `SUPPLY_RISK__THRESHOLDS__LOW_MAX`, …
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("failed to seed default risk settings")?;
        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(Self::ENV_PREFIX)
                .separator(Self::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let settings: Self = builder
            .build()
            .context("failed to assemble risk settings")?
            .try_deserialize()
            .context("invalid risk settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.thresholds.validate()?;
        if self.top_n == 0 {
            anyhow::bail!("top_n must be at least 1");
        }
        Ok(())
    }

    pub fn risk_config(&self) -> RiskConfig {
        RiskConfig {
            weights: self.weights,
            thresholds: self.thresholds,
        }
    }
}
