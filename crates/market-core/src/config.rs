//! Configuration System
//!
//! Loads run parameters from a TOML file. Every section and field is
//! optional; missing values fall back to the defaults of the reference run
//! (4000 consumers, 400 suppliers, a 30x30 torus, 100 ticks).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::setup::PopulationSpec;
use crate::systems::matching::MarketRules;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "market.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub grid: GridConfig,
    /// Price and starting endowments
    #[serde(default)]
    pub economy: MarketRules,
}

/// Run length and seeding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks: u64,
    /// Fixed seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 100,
            seed: None,
        }
    }
}

/// Agent counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub consumers: u32,
    pub suppliers: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            consumers: 4000,
            suppliers: 400,
        }
    }
}

impl From<&PopulationConfig> for PopulationSpec {
    fn from(config: &PopulationConfig) -> Self {
        PopulationSpec {
            consumers: config.consumers,
            suppliers: config.suppliers,
        }
    }
}

/// Torus dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
        }
    }
}

impl MarketConfig {
    /// Small deterministic configuration, convenient for tests and demos
    pub fn seeded(consumers: u32, suppliers: u32, width: u32, height: u32, seed: u64) -> Self {
        Self {
            simulation: SimulationConfig {
                ticks: 100,
                seed: Some(seed),
            },
            population: PopulationConfig {
                consumers,
                suppliers,
            },
            grid: GridConfig { width, height },
            economy: MarketRules::default(),
        }
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.economy.price == 0 {
            return Err(ConfigError::Invalid("price must be positive".to_string()));
        }
        let economy = &self.economy;
        let units = economy.supplier_supply.min(economy.supplier_inventory);
        if units.checked_mul(economy.price).is_none() {
            return Err(ConfigError::Invalid(format!(
                "a supplier selling {} units at price {} would overflow its revenue",
                units, economy.price
            )));
        }
        if self.grid.width < 3 || self.grid.height < 3 {
            tracing::warn!(
                width = self.grid.width,
                height = self.grid.height,
                "grids smaller than 3x3 have degenerate neighbourhoods"
            );
        }
        Ok(())
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
