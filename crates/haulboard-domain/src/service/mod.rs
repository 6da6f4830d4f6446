//! Load-planning services

pub mod capacity;
pub mod location_grouper;
pub mod normalizer;
pub mod ordering;
pub mod pallet_resolver;

pub use capacity::{CapacityState, Preview, RunLoad, RunSummary};
pub use location_grouper::{group_by_location, LocationGroup, UNKNOWN_LOCATION};
pub use normalizer::{
    extract_postcode, normalize_customer, normalize_destination, normalize_postcode,
    resolve_consignment_keys,
};
pub use pallet_resolver::{PalletResolver, PalletSource, ResolvedPallets, DEFAULT_FALLBACK_PALLETS};
