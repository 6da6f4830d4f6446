//! Delivery location registry loader from TOML

use std::fs;
use std::path::Path;

use serde::Deserialize;

use haulboard_domain::model::DeliveryLocation;
use haulboard_domain::service::normalize_destination;
use haulboard_types::{ConfigError, Error, Result};

/// Container for parsing locations.toml
#[derive(Debug, Deserialize)]
struct LocationRegistryConfig {
    #[serde(default)]
    locations: Vec<DeliveryLocation>,
}

/// Delivery locations loaded from TOML, in file order
#[derive(Debug)]
pub struct LocationRegistryLoader {
    locations: Vec<DeliveryLocation>,
}

impl LocationRegistryLoader {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to read location registry {}: {}",
                path.display(),
                e
            )))
        })?;

        Self::load_from_str(&content)
    }

    /// Parse registry TOML. Destination keys are normalized on load.
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let config: LocationRegistryConfig = toml::from_str(toml_content).map_err(|e| {
            Error::Config(ConfigError::ParseError(format!(
                "Failed to parse location registry TOML: {}",
                e
            )))
        })?;

        let mut locations = Vec::with_capacity(config.locations.len());
        for mut location in config.locations {
            if location.id.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "location '{}' has a blank id",
                    location.display_name
                )));
            }
            if locations.iter().any(|l: &DeliveryLocation| l.id == location.id) {
                return Err(Error::InvalidInput(format!(
                    "duplicate location id {}",
                    location.id
                )));
            }
            location.destination_key = location
                .destination_key
                .as_deref()
                .and_then(normalize_destination);
            locations.push(location);
        }

        Ok(Self { locations })
    }

    pub fn count(&self) -> usize {
        self.locations.len()
    }

    pub fn into_locations(self) -> Vec<DeliveryLocation> {
        self.locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TOML: &str = r#"
[[locations]]
id = "LOC-TP"
display_name = "Trafford Park DC"
destination_key = "trafford-park"

[[locations]]
id = "LOC-LDS"
display_name = "Leeds Hub"
"#;

    #[test]
    fn test_load_from_str() {
        let loader = LocationRegistryLoader::load_from_str(TEST_TOML).unwrap();
        assert_eq!(loader.count(), 2);
        let locations = loader.into_locations();
        assert_eq!(locations[1].id, "LOC-LDS");
        assert_eq!(locations[1].display_name, "Leeds Hub");
        assert_eq!(locations[1].destination_key, None);
    }

    #[test]
    fn test_destination_key_normalized() {
        let loader = LocationRegistryLoader::load_from_str(TEST_TOML).unwrap();
        let locations = loader.into_locations();
        assert_eq!(locations[0].id, "LOC-TP");
        assert_eq!(locations[0].destination_key.as_deref(), Some("TRAFFORD PARK"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let toml = r#"
[[locations]]
id = "A"
display_name = "One"

[[locations]]
id = "A"
display_name = "Two"
"#;
        let err = LocationRegistryLoader::load_from_str(toml).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = LocationRegistryLoader::load_from_str("[[locations]\n").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
    }
}
