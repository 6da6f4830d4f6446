//! Shared enums for the planning board

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Loading pass of a lorry.
///
/// A lorry is emptied between passes, so each run gets the full declared
/// capacity of the lorry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Run {
    /// Run 1, the primary pass (`is_reload == false`)
    Primary,
    /// Run 2, the reload pass (`is_reload == true`)
    Reload,
}

impl Run {
    pub fn from_reload_flag(is_reload: bool) -> Self {
        if is_reload {
            Run::Reload
        } else {
            Run::Primary
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Run::Primary => 1,
            Run::Reload => 2,
        }
    }
}

impl std::fmt::Display for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Run {}", self.number())
    }
}

/// Operational status of a lorry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LorryStatus {
    #[default]
    OnRoad,
    OffRoad,
    Service,
}

impl LorryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LorryStatus::OnRoad => "on road",
            LorryStatus::OffRoad => "off road",
            LorryStatus::Service => "service",
        }
    }
}

/// Percentages at which a fill level changes band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    /// Lowest percentage that counts as `Warning`
    pub warning: f64,
    /// Percentages strictly above this are `Critical`
    pub critical: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            warning: 70.0,
            critical: 90.0,
        }
    }
}

/// Severity band of a fill percentage
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityBand {
    /// Below the warning threshold
    Nominal,
    /// Between warning and critical, both inclusive
    Warning,
    /// Above the critical threshold
    Critical,
}

impl CapacityBand {
    pub fn from_percent(percent: f64, thresholds: &BandThresholds) -> Self {
        match percent {
            p if p < thresholds.warning => CapacityBand::Nominal,
            p if p <= thresholds.critical => CapacityBand::Warning,
            _ => CapacityBand::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityBand::Nominal => "nominal",
            CapacityBand::Warning => "warning",
            CapacityBand::Critical => "critical",
        }
    }
}
