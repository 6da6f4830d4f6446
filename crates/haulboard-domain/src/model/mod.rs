//! Domain model types

pub mod assignment;
pub mod consignment;
pub mod customer;
pub mod location;
pub mod lorry;

pub use assignment::{Assignment, PlannedJob};
pub use consignment::{Consignment, PalletOverride};
pub use customer::CustomerProfile;
pub use location::DeliveryLocation;
pub use lorry::{Lorry, DEFAULT_WEIGHT_CAPACITY};
