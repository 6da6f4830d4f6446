//! Lorry (truck) definitions

use haulboard_types::LorryStatus;
use serde::{Deserialize, Serialize};

/// Weight capacity used when a lorry does not declare one
pub const DEFAULT_WEIGHT_CAPACITY: f64 = 24_000.0;

/// A lorry with declared pallet and weight capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lorry {
    pub id: String,
    pub name: String,
    /// Declared pallet spaces
    pub capacity_pallets: u32,
    /// Declared payload; `None` falls back to the configured default
    #[serde(default)]
    pub capacity_weight: Option<f64>,
    #[serde(default)]
    pub status: LorryStatus,
}

impl Lorry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity_pallets: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity_pallets,
            capacity_weight: None,
            status: LorryStatus::OnRoad,
        }
    }

    pub fn with_weight_capacity(mut self, weight: f64) -> Self {
        self.capacity_weight = Some(weight);
        self
    }

    /// Pallet capacity, never below 1 so ratios stay defined
    pub fn effective_pallet_capacity(&self) -> u32 {
        self.capacity_pallets.max(1)
    }

    /// Declared weight capacity, or `default` when unset or not positive
    pub fn effective_weight_capacity(&self, default: f64) -> f64 {
        match self.capacity_weight {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pallet_capacity_clamped() {
        let lorry = Lorry::new("L1", "Broken", 0);
        assert_eq!(lorry.effective_pallet_capacity(), 1);
    }

    #[test]
    fn test_weight_capacity_default() {
        let lorry = Lorry::new("L1", "Unit 1", 26);
        assert_eq!(
            lorry.effective_weight_capacity(DEFAULT_WEIGHT_CAPACITY),
            24_000.0
        );
        let lorry = lorry.with_weight_capacity(18_000.0);
        assert_eq!(
            lorry.effective_weight_capacity(DEFAULT_WEIGHT_CAPACITY),
            18_000.0
        );
    }
}
