//! Board store: consignments, lorries, assignments and reference data
//!
//! Every mutation runs under one write lock on a copy of the state; the copy
//! is persisted and swapped in only if the whole change succeeded.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use haulboard_domain::model::{
    Assignment, Consignment, CustomerProfile, DeliveryLocation, Lorry, PalletOverride,
};
use haulboard_domain::repository::{
    ConsignmentRepository, CustomerProfileRepository, DeliveryLocationRepository,
    LorryRepository, PalletOverrideRepository,
};
use haulboard_domain::service::ordering;
use haulboard_types::{Error, Result};

const STORE_FILE: &str = "board.json";

/// Everything the store holds, as written to disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub consignments: BTreeMap<String, Consignment>,
    #[serde(default)]
    pub overrides: BTreeMap<String, PalletOverride>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CustomerProfile>,
    #[serde(default)]
    pub lorries: BTreeMap<String, Lorry>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub locations: Vec<DeliveryLocation>,
}

impl BoardState {
    fn lorry_assignments(&self, lorry_id: &str) -> Vec<Assignment> {
        ordering::sorted(
            self.assignments
                .iter()
                .filter(|a| a.lorry_id == lorry_id)
                .cloned()
                .collect(),
        )
    }

    fn replace_lorry_assignments(&mut self, lorry_id: &str, list: Vec<Assignment>) {
        self.assignments.retain(|a| a.lorry_id != lorry_id);
        self.assignments.extend(list);
    }

    fn require_lorry(&self, lorry_id: &str) -> Result<()> {
        if self.lorries.contains_key(lorry_id) {
            Ok(())
        } else {
            Err(Error::LorryNotFound(lorry_id.to_string()))
        }
    }
}

/// Persistent (or in-memory) store for the planning board
pub struct BoardStore {
    store_path: Option<PathBuf>,
    state: RwLock<BoardState>,
}

impl BoardStore {
    /// Store that lives only as long as the value
    pub fn in_memory() -> Self {
        Self::from_state(BoardState::default())
    }

    pub fn from_state(state: BoardState) -> Self {
        Self {
            store_path: None,
            state: RwLock::new(state),
        }
    }

    /// Create or load a store under `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join(STORE_FILE);

        let state = if store_path.exists() {
            let file = File::open(&store_path)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader)?
        } else {
            BoardState::default()
        };

        debug!(path = %store_path.display(), "opened board store");
        Ok(Self {
            store_path: Some(store_path),
            state: RwLock::new(state),
        })
    }

    pub fn store_path(&self) -> Option<&Path> {
        self.store_path.as_deref()
    }

    /// Insert or replace consignments by id. Returns how many were written.
    pub fn upsert_consignments(
        &self,
        consignments: impl IntoIterator<Item = Consignment>,
    ) -> Result<usize> {
        let consignments: Vec<Consignment> = consignments.into_iter().collect();
        self.mutate(|state| {
            let count = consignments.len();
            for c in consignments {
                state.consignments.insert(c.id.clone(), c);
            }
            Ok(count)
        })
    }

    pub fn upsert_consignment(&self, consignment: Consignment) -> Result<()> {
        self.upsert_consignments([consignment]).map(|_| ())
    }

    pub fn upsert_lorry(&self, lorry: Lorry) -> Result<()> {
        if lorry.id.trim().is_empty() {
            return Err(Error::InvalidInput("lorry id must not be blank".to_string()));
        }
        if lorry.capacity_pallets == 0 {
            return Err(Error::InvalidInput(format!(
                "lorry {} needs at least one pallet space",
                lorry.id
            )));
        }
        self.mutate(|state| {
            state.lorries.insert(lorry.id.clone(), lorry);
            Ok(())
        })
    }

    pub fn upsert_profile(&self, profile: CustomerProfile) -> Result<()> {
        self.mutate(|state| {
            state.profiles.insert(profile.customer_key.clone(), profile);
            Ok(())
        })
    }

    /// Replace the whole delivery location registry
    pub fn replace_locations(&self, locations: Vec<DeliveryLocation>) -> Result<()> {
        self.mutate(|state| {
            state.locations = locations;
            Ok(())
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BoardState>> {
        self.state
            .read()
            .map_err(|_| Error::Io(std::io::Error::other("board store lock poisoned")))
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut BoardState) -> Result<T>) -> Result<T> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| Error::Io(std::io::Error::other("board store lock poisoned")))?;

        let mut next = guard.clone();
        let value = apply(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(value)
    }

    /// Write to a sibling temp file, then rename over the store file
    fn persist(&self, state: &BoardState) -> Result<()> {
        let Some(path) = self.store_path.as_ref() else {
            return Ok(());
        };
        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, state)?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl ConsignmentRepository for BoardStore {
    fn find_consignment(&self, id: &str) -> Result<Option<Consignment>> {
        Ok(self.read()?.consignments.get(id).cloned())
    }

    fn find_active_consignments(&self) -> Result<Vec<Consignment>> {
        Ok(self
            .read()?
            .consignments
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect())
    }
}

impl PalletOverrideRepository for BoardStore {
    fn find_override(&self, consignment_id: &str) -> Result<Option<PalletOverride>> {
        Ok(self.read()?.overrides.get(consignment_id).cloned())
    }

    fn apply_override(
        &self,
        consignment_id: &str,
        record: Option<&PalletOverride>,
        effective_pallets: u32,
    ) -> Result<Option<Assignment>> {
        self.mutate(|state| {
            match record {
                Some(r) => {
                    state.overrides.insert(consignment_id.to_string(), r.clone());
                }
                None => {
                    state.overrides.remove(consignment_id);
                }
            }

            let Some(lorry_id) = state
                .assignments
                .iter()
                .find(|a| a.consignment_id == consignment_id)
                .map(|a| a.lorry_id.clone())
            else {
                return Ok(None);
            };

            let mut list = state.lorry_assignments(&lorry_id);
            for a in list.iter_mut().filter(|a| a.consignment_id == consignment_id) {
                a.effective_pallets = effective_pallets;
            }
            ordering::check_invariants(&lorry_id, &list)?;

            let updated = list
                .iter()
                .find(|a| a.consignment_id == consignment_id)
                .cloned();
            state.replace_lorry_assignments(&lorry_id, list);
            debug!(
                consignment_id,
                lorry_id = %lorry_id,
                effective_pallets,
                "applied pallet override"
            );
            Ok(updated)
        })
    }
}

impl CustomerProfileRepository for BoardStore {
    fn find_profile(&self, customer_key: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.read()?.profiles.get(customer_key).cloned())
    }
}

impl DeliveryLocationRepository for BoardStore {
    fn find_all_locations(&self) -> Result<Vec<DeliveryLocation>> {
        Ok(self.read()?.locations.clone())
    }
}

impl LorryRepository for BoardStore {
    fn find_lorry(&self, id: &str) -> Result<Option<Lorry>> {
        Ok(self.read()?.lorries.get(id).cloned())
    }

    fn find_all_lorries(&self) -> Result<Vec<Lorry>> {
        Ok(self.read()?.lorries.values().cloned().collect())
    }

    fn list_assignments(&self, lorry_id: &str) -> Result<Vec<Assignment>> {
        let state = self.read()?;
        state.require_lorry(lorry_id)?;
        Ok(state.lorry_assignments(lorry_id))
    }

    fn find_assignment(&self, assignment_id: &str) -> Result<Option<Assignment>> {
        Ok(self
            .read()?
            .assignments
            .iter()
            .find(|a| a.id == assignment_id)
            .cloned())
    }

    fn find_assignment_for_consignment(&self, consignment_id: &str) -> Result<Option<Assignment>> {
        Ok(self
            .read()?
            .assignments
            .iter()
            .find(|a| a.consignment_id == consignment_id)
            .cloned())
    }

    fn insert_assignment(&self, assignment: Assignment) -> Result<Assignment> {
        self.mutate(|state| {
            state.require_lorry(&assignment.lorry_id)?;
            if let Some(existing) = state
                .assignments
                .iter()
                .find(|a| a.consignment_id == assignment.consignment_id)
            {
                return Err(Error::AlreadyAssigned {
                    consignment_id: assignment.consignment_id.clone(),
                    lorry_id: existing.lorry_id.clone(),
                });
            }

            let lorry_id = assignment.lorry_id.clone();
            let assignment_id = assignment.id.clone();
            let list = ordering::append_to_primary(state.lorry_assignments(&lorry_id), assignment)?;
            ordering::check_invariants(&lorry_id, &list)?;

            let stored = list
                .iter()
                .find(|a| a.id == assignment_id)
                .cloned()
                .ok_or_else(|| Error::AssignmentNotFound(assignment_id.clone()))?;
            state.replace_lorry_assignments(&lorry_id, list);
            info!(
                consignment_id = %stored.consignment_id,
                lorry_id = %lorry_id,
                sort_order = stored.sort_order,
                "stored assignment"
            );
            Ok(stored)
        })
    }

    fn remove_assignment_for_consignment(&self, consignment_id: &str) -> Result<Option<Assignment>> {
        self.mutate(|state| {
            let removed = state
                .assignments
                .iter()
                .position(|a| a.consignment_id == consignment_id)
                .map(|index| state.assignments.remove(index));
            Ok(removed)
        })
    }

    fn update_assignments(
        &self,
        lorry_id: &str,
        apply: &mut dyn FnMut(Vec<Assignment>) -> Result<Vec<Assignment>>,
    ) -> Result<Vec<Assignment>> {
        self.mutate(|state| {
            state.require_lorry(lorry_id)?;
            let next = apply(state.lorry_assignments(lorry_id))?;
            ordering::check_invariants(lorry_id, &next)?;

            if let Some(clash) = next.iter().find_map(|a| {
                state
                    .assignments
                    .iter()
                    .find(|other| other.lorry_id != lorry_id && other.consignment_id == a.consignment_id)
            }) {
                return Err(Error::AlreadyAssigned {
                    consignment_id: clash.consignment_id.clone(),
                    lorry_id: clash.lorry_id.clone(),
                });
            }

            state.replace_lorry_assignments(lorry_id, next.clone());
            Ok(ordering::sorted(next))
        })
    }
}
