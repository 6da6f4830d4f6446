//! Repository trait definitions for the planning board's collaborators
//!
//! Implementations must apply every mutating call atomically: either the
//! whole change is stored or nothing is.

use haulboard_types::Error;

use crate::model::{
    Assignment, Consignment, CustomerProfile, DeliveryLocation, Lorry, PalletOverride,
};

/// Read access to ingested consignments
pub trait ConsignmentRepository {
    /// Find a consignment by id, archived or not
    fn find_consignment(&self, id: &str) -> Result<Option<Consignment>, Error>;

    /// All consignments that are not archived
    fn find_active_consignments(&self) -> Result<Vec<Consignment>, Error>;
}

/// Manual pallet corrections
pub trait PalletOverrideRepository {
    fn find_override(&self, consignment_id: &str) -> Result<Option<PalletOverride>, Error>;

    /// Save (`Some`) or drop (`None`) the override of `consignment_id` and
    /// set `effective_pallets` on its assignment, if it has one.
    ///
    /// Both changes are one atomic step. Returns the updated assignment.
    fn apply_override(
        &self,
        consignment_id: &str,
        record: Option<&PalletOverride>,
        effective_pallets: u32,
    ) -> Result<Option<Assignment>, Error>;
}

/// Customer defaults looked up by normalized customer key
pub trait CustomerProfileRepository {
    fn find_profile(&self, customer_key: &str) -> Result<Option<CustomerProfile>, Error>;
}

/// Lorries and their assignments
pub trait LorryRepository {
    fn find_lorry(&self, id: &str) -> Result<Option<Lorry>, Error>;

    fn find_all_lorries(&self) -> Result<Vec<Lorry>, Error>;

    /// Assignments of one lorry, ordered by `sort_order`
    fn list_assignments(&self, lorry_id: &str) -> Result<Vec<Assignment>, Error>;

    fn find_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>, Error>;

    fn find_assignment_for_consignment(
        &self,
        consignment_id: &str,
    ) -> Result<Option<Assignment>, Error>;

    /// Append an assignment to the end of its lorry's order.
    ///
    /// Must fail with `Error::AlreadyAssigned` if the consignment is
    /// assigned to any lorry; the check and the append are one atomic step.
    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment, Error>;

    /// Remove the assignment holding `consignment_id`, if any
    fn remove_assignment_for_consignment(
        &self,
        consignment_id: &str,
    ) -> Result<Option<Assignment>, Error>;

    /// Replace a lorry's whole assignment list with the output of `apply`.
    ///
    /// `apply` receives the current list (ordered) and runs while the lorry
    /// is locked against other writers. If it fails, nothing is stored.
    fn update_assignments(
        &self,
        lorry_id: &str,
        apply: &mut dyn FnMut(Vec<Assignment>) -> Result<Vec<Assignment>, Error>,
    ) -> Result<Vec<Assignment>, Error>;
}

/// Delivery location registry
pub trait DeliveryLocationRepository {
    fn find_all_locations(&self) -> Result<Vec<DeliveryLocation>, Error>;
}

/// Everything the planning service needs from storage
pub trait BoardRepository:
    ConsignmentRepository
    + PalletOverrideRepository
    + CustomerProfileRepository
    + LorryRepository
    + DeliveryLocationRepository
{
}

impl<T> BoardRepository for T where
    T: ConsignmentRepository
        + PalletOverrideRepository
        + CustomerProfileRepository
        + LorryRepository
        + DeliveryLocationRepository
{
}
