use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::service::normalizer::extract_postcode;

/// A delivery job as last seen by ingestion. Read-only to the planning core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consignment {
    pub id: String,
    pub customer_name: String,
    pub destination: String,
    #[serde(default)]
    pub customer_key: Option<String>,
    #[serde(default)]
    pub destination_key: Option<String>,
    /// Explicit delivery location chosen by a planner
    #[serde(default)]
    pub delivery_location_id: Option<String>,
    /// Pallets reported by the origin site. `Some(0)` is an explicit report.
    #[serde(default)]
    pub reported_pallets: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    pub last_seen_at: DateTime<Utc>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Consignment {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            destination: destination.into(),
            customer_key: None,
            destination_key: None,
            delivery_location_id: None,
            reported_pallets: None,
            weight: None,
            eta: None,
            status: String::new(),
            last_seen_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }

    pub fn postcode(&self) -> Option<String> {
        extract_postcode(&self.destination)
    }

    /// Whether the ETA falls on a day before `plan_date`.
    ///
    /// Display hint only; it never moves a job between runs.
    pub fn eta_before(&self, plan_date: NaiveDate) -> bool {
        self.eta
            .map(|eta| eta.date_naive() < plan_date)
            .unwrap_or(false)
    }

    /// Origin site reported zero pallets, i.e. the count is still awaited.
    pub fn awaiting_pallet_count(&self) -> bool {
        self.reported_pallets == Some(0)
    }
}

/// Manually corrected pallet count for one consignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PalletOverride {
    pub consignment_id: String,
    pub pallets: u32,
    pub updated_at: DateTime<Utc>,
}

impl PalletOverride {
    pub fn new(consignment_id: impl Into<String>, pallets: u32) -> Self {
        Self {
            consignment_id: consignment_id.into(),
            pallets,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_eta_before_plan_date() {
        let mut c = Consignment::new("C1", "Acme", "Leeds");
        let plan = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(!c.eta_before(plan));

        c.eta = Some(Utc.with_ymd_and_hms(2026, 3, 9, 23, 0, 0).unwrap());
        assert!(c.eta_before(plan));

        c.eta = Some(Utc.with_ymd_and_hms(2026, 3, 10, 0, 30, 0).unwrap());
        assert!(!c.eta_before(plan));
    }

    #[test]
    fn test_postcode_from_destination() {
        let c = Consignment::new("C1", "Acme", "Unit 4, Leeds LS1 4AP");
        assert_eq!(c.postcode(), Some("LS1 4AP".to_string()));
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "id": "C9",
            "customer_name": "Acme",
            "destination": "Depot",
            "last_seen_at": "2026-03-10T06:00:00Z"
        }"#;
        let c: Consignment = serde_json::from_str(json).unwrap();
        assert!(c.is_active());
        assert!(c.reported_pallets.is_none());
        assert!(c.delivery_location_id.is_none());
    }
}
