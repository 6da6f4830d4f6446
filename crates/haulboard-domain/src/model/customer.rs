use serde::{Deserialize, Serialize};

/// Per-customer defaults, keyed by normalized customer key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_key: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Pallets assumed when a consignment carries no figure of its own
    pub default_pallets: u32,
}
