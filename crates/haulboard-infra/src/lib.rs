//! Infrastructure layer - persistence and data loaders

pub mod consignment_csv;
pub mod location_loader;
pub mod persistence;
