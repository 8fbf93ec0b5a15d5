//! # Configuration
//!
//! User defaults stored as TOML. Every section is optional, so a partial
//! file fills the rest from defaults.
//!
//! ```toml
//! [markups]
//! profit_pct = 15.0
//! packing_pct = 2.0
//! overheads_pct = 10.0
//!
//! [weight]
//! specific_gravity = 7.85
//! shape = "flat"
//!
//! [display]
//! currency = "INR"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calculations::weight::ShapeKind;
use crate::errors::{CalcError, CalcResult};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default)]
    pub markups: MarkupDefaults,
    #[serde(default)]
    pub weight: WeightDefaults,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub workbook: WorkbookConfig,
}

/// Percentages applied to new estimations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkupDefaults {
    #[serde(default = "default_profit_pct")]
    pub profit_pct: f64,
    #[serde(default = "default_packing_pct")]
    pub packing_pct: f64,
    #[serde(default = "default_overheads_pct")]
    pub overheads_pct: f64,
}

impl Default for MarkupDefaults {
    fn default() -> Self {
        MarkupDefaults {
            profit_pct: default_profit_pct(),
            packing_pct: default_packing_pct(),
            overheads_pct: default_overheads_pct(),
        }
    }
}

/// Starting values of the weight calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightDefaults {
    #[serde(default = "default_specific_gravity")]
    pub specific_gravity: f64,
    #[serde(default)]
    pub shape: ShapeKind,
}

impl Default for WeightDefaults {
    fn default() -> Self {
        WeightDefaults {
            specific_gravity: default_specific_gravity(),
            shape: ShapeKind::default(),
        }
    }
}

/// Formatting of displayed figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_money_decimals")]
    pub money_decimals: u32,
    #[serde(default = "default_volume_decimals")]
    pub volume_decimals: u32,
    #[serde(default = "default_weight_decimals")]
    pub weight_decimals: u32,
    #[serde(default = "default_conversion_decimals")]
    pub conversion_decimals: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency: default_currency(),
            money_decimals: default_money_decimals(),
            volume_decimals: default_volume_decimals(),
            weight_decimals: default_weight_decimals(),
            conversion_decimals: default_conversion_decimals(),
        }
    }
}

impl DisplayConfig {
    /// Format an amount with the configured currency code
    pub fn money(&self, amount: f64) -> String {
        format!("{} {:.*}", self.currency, self.money_decimals as usize, amount)
    }
}

/// Workbook file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookConfig {
    /// Identifier written into lock files
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        WorkbookConfig {
            user_id: default_user_id(),
        }
    }
}

fn default_profit_pct() -> f64 {
    15.0
}
fn default_packing_pct() -> f64 {
    2.0
}
fn default_overheads_pct() -> f64 {
    10.0
}
fn default_specific_gravity() -> f64 {
    7.85
}
fn default_currency() -> String {
    "INR".to_string()
}
fn default_money_decimals() -> u32 {
    2
}
fn default_volume_decimals() -> u32 {
    2
}
fn default_weight_decimals() -> u32 {
    3
}
fn default_conversion_decimals() -> u32 {
    4
}
fn default_user_id() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

impl EstimatorConfig {
    /// `<config dir>/costing/config.toml`
    pub fn default_path() -> CalcResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalcError::config("Could not determine config directory"))?;
        Ok(config_dir.join("costing").join("config.toml"))
    }

    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load_from(path: &Path) -> CalcResult<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            CalcError::file_error("read config", path.display().to_string(), e.to_string())
        })?;
        Self::from_toml(&content)
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> CalcResult<Self> {
        toml::from_str(content)
            .map_err(|e| CalcError::config(format!("Failed to parse config: {}", e)))
    }

    /// Write pretty TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> CalcResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                let dir = parent.display().to_string();
                CalcError::file_error("create config dir", dir, e.to_string())
            })?;
        }
        let content = toml::to_string_pretty(self).map_err(CalcError::serialization)?;
        fs::write(path, content).map_err(|e| {
            CalcError::file_error("write config", path.display().to_string(), e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_defaults_match_estimation_form() {
        let config = EstimatorConfig::default();
        assert_eq!(config.markups.profit_pct, 15.0);
        assert_eq!(config.markups.packing_pct, 2.0);
        assert_eq!(config.markups.overheads_pct, 10.0);
        assert_eq!(config.weight.specific_gravity, 7.85);
        assert_eq!(config.weight.shape, ShapeKind::Flat);
        assert_eq!(config.display.conversion_decimals, 4);
    }

    #[test]
    fn test_partial_toml() {
        let config = EstimatorConfig::from_toml("[markups]\nprofit_pct = 20.0\n").unwrap();
        assert_eq!(config.markups.profit_pct, 20.0);
        assert_eq!(config.markups.packing_pct, 2.0);
        assert_eq!(config.display.currency, "INR");
    }

    #[test]
    fn test_invalid_toml() {
        let err = EstimatorConfig::from_toml("[markups\n").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_dir().join("costing_test_config").join("config.toml");
        let mut config = EstimatorConfig::default();
        config.weight.shape = ShapeKind::Hexagon;
        config.display.currency = "EUR".to_string();
        config.save_to(&path).unwrap();

        let loaded = EstimatorConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_dir().join("costing_test_config_absent.toml");
        let _ = fs::remove_file(&path);
        assert_eq!(EstimatorConfig::load_from(&path).unwrap(), EstimatorConfig::default());
    }

    #[test]
    fn test_money_format() {
        let display = DisplayConfig::default();
        assert_eq!(display.money(7086.6), "INR 7086.60");
    }
}
