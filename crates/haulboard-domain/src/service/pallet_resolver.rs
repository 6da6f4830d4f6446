//! Authoritative pallet count for a consignment
//!
//! Precedence: manual override > site-reported (zero included) >
//! customer default > configured fallback.

use haulboard_types::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Consignment;
use crate::repository::{
    ConsignmentRepository, CustomerProfileRepository, PalletOverrideRepository,
};

/// Fallback used when nothing else is known and configuration says nothing
pub const DEFAULT_FALLBACK_PALLETS: u32 = 1;

/// Where a resolved pallet count came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PalletSource {
    Override,
    Reported,
    CustomerDefault,
    Fallback,
}

impl PalletSource {
    pub fn label(&self) -> &'static str {
        match self {
            PalletSource::Override => "manual override",
            PalletSource::Reported => "site reported",
            PalletSource::CustomerDefault => "customer default",
            PalletSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPallets {
    pub pallets: u32,
    pub source: PalletSource,
}

pub struct PalletResolver<'a> {
    consignments: &'a dyn ConsignmentRepository,
    overrides: &'a dyn PalletOverrideRepository,
    profiles: &'a dyn CustomerProfileRepository,
    fallback: u32,
}

impl<'a> PalletResolver<'a> {
    pub fn new(
        consignments: &'a dyn ConsignmentRepository,
        overrides: &'a dyn PalletOverrideRepository,
        profiles: &'a dyn CustomerProfileRepository,
        fallback: u32,
    ) -> Self {
        Self {
            consignments,
            overrides,
            profiles,
            fallback,
        }
    }

    pub fn resolve_effective_pallets(&self, consignment_id: &str) -> Result<u32> {
        Ok(self.resolve(consignment_id)?.pallets)
    }

    pub fn resolve(&self, consignment_id: &str) -> Result<ResolvedPallets> {
        let resolved = self.resolve_inner(consignment_id)?;
        debug!(
            consignment_id,
            pallets = resolved.pallets,
            source = resolved.source.label(),
            "resolved pallets"
        );
        Ok(resolved)
    }

    fn resolve_inner(&self, consignment_id: &str) -> Result<ResolvedPallets> {
        let Some(consignment) = self.consignments.find_consignment(consignment_id)? else {
            return Ok(self.fallback_value());
        };

        if let Some(record) = self.overrides.find_override(consignment_id)? {
            return Ok(ResolvedPallets {
                pallets: record.pallets,
                source: PalletSource::Override,
            });
        }

        self.resolve_from_sources(&consignment)
    }

    /// Resolve as if no manual override were recorded
    pub fn resolve_ignoring_override(&self, consignment_id: &str) -> Result<ResolvedPallets> {
        match self.consignments.find_consignment(consignment_id)? {
            Some(consignment) => self.resolve_from_sources(&consignment),
            None => Ok(self.fallback_value()),
        }
    }

    fn resolve_from_sources(&self, consignment: &Consignment) -> Result<ResolvedPallets> {
        if let Some(reported) = consignment.reported_pallets {
            return Ok(ResolvedPallets {
                pallets: reported,
                source: PalletSource::Reported,
            });
        }

        if let Some(key) = consignment.customer_key.as_deref() {
            if let Some(profile) = self.profiles.find_profile(key)? {
                return Ok(ResolvedPallets {
                    pallets: profile.default_pallets,
                    source: PalletSource::CustomerDefault,
                });
            }
        }

        Ok(self.fallback_value())
    }

    fn fallback_value(&self) -> ResolvedPallets {
        ResolvedPallets {
            pallets: self.fallback,
            source: PalletSource::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, CustomerProfile, PalletOverride};
    use haulboard_types::Error;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Fixture {
        consignments: HashMap<String, Consignment>,
        overrides: RefCell<HashMap<String, PalletOverride>>,
        profiles: HashMap<String, CustomerProfile>,
    }

    impl ConsignmentRepository for Fixture {
        fn find_consignment(&self, id: &str) -> std::result::Result<Option<Consignment>, Error> {
            Ok(self.consignments.get(id).cloned())
        }

        fn find_active_consignments(&self) -> std::result::Result<Vec<Consignment>, Error> {
            Ok(self.consignments.values().cloned().collect())
        }
    }

    impl PalletOverrideRepository for Fixture {
        fn find_override(
            &self,
            consignment_id: &str,
        ) -> std::result::Result<Option<PalletOverride>, Error> {
            Ok(self.overrides.borrow().get(consignment_id).cloned())
        }

        fn apply_override(
            &self,
            consignment_id: &str,
            record: Option<&PalletOverride>,
            _effective_pallets: u32,
        ) -> std::result::Result<Option<Assignment>, Error> {
            let mut overrides = self.overrides.borrow_mut();
            match record {
                Some(r) => {
                    overrides.insert(consignment_id.to_string(), r.clone());
                }
                None => {
                    overrides.remove(consignment_id);
                }
            }
            Ok(None)
        }
    }

    impl CustomerProfileRepository for Fixture {
        fn find_profile(
            &self,
            customer_key: &str,
        ) -> std::result::Result<Option<CustomerProfile>, Error> {
            Ok(self.profiles.get(customer_key).cloned())
        }
    }

    fn fixture(reported: Option<u32>) -> Fixture {
        let mut c = Consignment::new("C1", "Acme Limited", "Leeds");
        c.customer_key = Some("ACME LTD".to_string());
        c.reported_pallets = reported;

        let mut f = Fixture::default();
        f.consignments.insert(c.id.clone(), c);
        f.profiles.insert(
            "ACME LTD".to_string(),
            CustomerProfile {
                customer_key: "ACME LTD".to_string(),
                display_name: None,
                default_pallets: 7,
            },
        );
        f
    }

    fn resolver(f: &Fixture, fallback: u32) -> PalletResolver<'_> {
        PalletResolver::new(f, f, f, fallback)
    }

    #[test]
    fn test_override_wins() {
        let f = fixture(Some(3));
        f.apply_override("C1", Some(&PalletOverride::new("C1", 5)), 5).unwrap();
        let r = resolver(&f, 1).resolve("C1").unwrap();
        assert_eq!(r.pallets, 5);
        assert_eq!(r.source, PalletSource::Override);
    }

    #[test]
    fn test_ignoring_override_falls_through() {
        let f = fixture(None);
        f.apply_override("C1", Some(&PalletOverride::new("C1", 5)), 5).unwrap();
        let r = resolver(&f, 1).resolve_ignoring_override("C1").unwrap();
        assert_eq!(r.pallets, 7);
        assert_eq!(r.source, PalletSource::CustomerDefault);
    }

    #[test]
    fn test_reported_beats_customer_default() {
        let f = fixture(Some(3));
        assert_eq!(resolver(&f, 1).resolve_effective_pallets("C1").unwrap(), 3);
    }

    #[test]
    fn test_reported_zero_is_authoritative() {
        let f = fixture(Some(0));
        let r = resolver(&f, 1).resolve("C1").unwrap();
        assert_eq!(r.pallets, 0);
        assert_eq!(r.source, PalletSource::Reported);
    }

    #[test]
    fn test_customer_default_when_unreported() {
        let f = fixture(None);
        let r = resolver(&f, 1).resolve("C1").unwrap();
        assert_eq!(r.pallets, 7);
        assert_eq!(r.source, PalletSource::CustomerDefault);
    }

    #[test]
    fn test_fallback_without_profile() {
        let mut f = fixture(None);
        f.profiles.clear();
        assert_eq!(resolver(&f, 2).resolve_effective_pallets("C1").unwrap(), 2);
    }

    #[test]
    fn test_missing_consignment_uses_fallback() {
        let f = fixture(Some(3));
        let r = resolver(&f, DEFAULT_FALLBACK_PALLETS).resolve("NOPE").unwrap();
        assert_eq!(r.pallets, 1);
        assert_eq!(r.source, PalletSource::Fallback);
    }

    #[test]
    fn test_override_on_missing_consignment_ignored() {
        let f = fixture(Some(3));
        f.apply_override("GHOST", Some(&PalletOverride::new("GHOST", 9)), 9).unwrap();
        assert_eq!(resolver(&f, 4).resolve_effective_pallets("GHOST").unwrap(), 4);
    }
}
