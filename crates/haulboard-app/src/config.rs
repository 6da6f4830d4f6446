//! Configuration management for haulboard
//!
//! Config stored at: ~/.config/haulboard/config.json

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use haulboard_domain::model::DEFAULT_WEIGHT_CAPACITY;
use haulboard_domain::service::DEFAULT_FALLBACK_PALLETS;
use haulboard_types::{BandThresholds, ConfigError, OutputFormat, Result};

use crate::app::PlanningPolicy;

/// Environment variable overriding `default_pallets`, read once at startup
pub const DEFAULT_PALLETS_ENV: &str = "HAULBOARD_DEFAULT_PALLETS";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pallets assumed when nothing else is known about a consignment
    #[serde(default = "default_pallets")]
    pub default_pallets: u32,

    /// Pallets counted for a job with zero/unknown pallets while previewing
    #[serde(default = "default_missing_pallets_fallback")]
    pub missing_pallets_fallback: u32,

    /// Weight capacity for lorries that do not declare one
    #[serde(default = "default_weight_capacity")]
    pub default_weight_capacity: f64,

    /// Fill percentage at which a run turns amber
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,

    /// Fill percentage above which a run turns red
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,

    /// Store directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_pallets() -> u32 {
    DEFAULT_FALLBACK_PALLETS
}

fn default_missing_pallets_fallback() -> u32 {
    1
}

fn default_weight_capacity() -> f64 {
    DEFAULT_WEIGHT_CAPACITY
}

fn default_warning_threshold() -> f64 {
    BandThresholds::default().warning
}

fn default_critical_threshold() -> f64 {
    BandThresholds::default().critical
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_pallets: default_pallets(),
            missing_pallets_fallback: default_missing_pallets_fallback(),
            default_weight_capacity: default_weight_capacity(),
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
            store_dir: None,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("haulboard");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the store directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("haulboard");
        Ok(data_dir)
    }

    /// Load config from the default location, then apply the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        let env_value = std::env::var(DEFAULT_PALLETS_ENV).ok();
        config.apply_default_pallets_override(env_value.as_deref())?;
        Ok(config)
    }

    /// Load config from a file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply the value of [`DEFAULT_PALLETS_ENV`], if set
    pub fn apply_default_pallets_override(&mut self, raw: Option<&str>) -> Result<()> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        let value: u32 = raw.parse().map_err(|_| {
            ConfigError::ParseError(format!(
                "{} must be a non-negative integer, got '{}'",
                DEFAULT_PALLETS_ENV, raw
            ))
        })?;
        debug!(default_pallets = value, "default pallets taken from environment");
        self.default_pallets = value;
        Ok(())
    }

    /// Reject values the planning core cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.default_weight_capacity.is_finite() && self.default_weight_capacity > 0.0) {
            return Err(ConfigError::ParseError(
                "default_weight_capacity must be a positive number".to_string(),
            )
            .into());
        }
        let thresholds_ok = self.warning_threshold.is_finite()
            && self.critical_threshold.is_finite()
            && self.warning_threshold >= 0.0
            && self.warning_threshold <= self.critical_threshold;
        if !thresholds_ok {
            return Err(ConfigError::ParseError(format!(
                "thresholds must satisfy 0 <= warning ({}) <= critical ({})",
                self.warning_threshold, self.critical_threshold
            ))
            .into());
        }
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveError(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    pub fn thresholds(&self) -> BandThresholds {
        BandThresholds {
            warning: self.warning_threshold,
            critical: self.critical_threshold,
        }
    }

    pub fn policy(&self) -> PlanningPolicy {
        PlanningPolicy {
            fallback_pallets: self.default_pallets,
            missing_pallets_fallback: self.missing_pallets_fallback,
            default_weight_capacity: self.default_weight_capacity,
            thresholds: self.thresholds(),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Haulboard Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Default pallets:          {}", self.default_pallets)?;
        writeln!(f, "Missing-pallets fallback: {}", self.missing_pallets_fallback)?;
        writeln!(f, "Default weight capacity:  {:.0}", self.default_weight_capacity)?;
        writeln!(
            f,
            "Bands:                    warning >= {:.0}%, critical > {:.0}%",
            self.warning_threshold, self.critical_threshold
        )?;
        writeln!(
            f,
            "Store dir:                {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:            {}", self.output_format)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:              {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulboard_types::Error;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_pallets, 1);
        assert_eq!(config.missing_pallets_fallback, 1);
        assert_eq!(config.default_weight_capacity, 24_000.0);
        assert_eq!(config.thresholds(), BandThresholds::default());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_default_pallets_override(Some(" 3 ")).unwrap();
        assert_eq!(config.default_pallets, 3);
        assert_eq!(config.policy().fallback_pallets, 3);

        config.apply_default_pallets_override(None).unwrap();
        assert_eq!(config.default_pallets, 3);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        let err = config.apply_default_pallets_override(Some("-1")).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
        assert_eq!(config.default_pallets, 1);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_pallets": 2, "output_format": "json" }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_pallets, 2);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.warning_threshold, 70.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.critical_threshold = 95.0;
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_thresholds() {
        let config = Config {
            warning_threshold: 95.0,
            critical_threshold: 90.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
