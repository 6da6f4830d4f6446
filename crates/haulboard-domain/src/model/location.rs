use serde::{Deserialize, Serialize};

/// Named delivery point from the location registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLocation {
    pub id: String,
    pub display_name: String,
    /// Normalized destination this location matches, if any
    #[serde(default)]
    pub destination_key: Option<String>,
}
