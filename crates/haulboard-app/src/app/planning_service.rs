//! Planning Service - use cases behind the planning board
//!
//! Wires the pallet resolver, ordering rules, capacity model and location
//! grouping to a `BoardRepository`:
//! 1. Placement changes: assign, unassign, reorder, reload flag, bulk reload
//! 2. Projections: current capacity, add/move previews
//! 3. Read models: per-lorry board, unassigned pool
//! 4. Pallet overrides
//!
//! Mutations go through the repository's atomic operations; capacity is
//! recomputed from the stored assignments on every read.

use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use haulboard_domain::model::{
    Assignment, Consignment, Lorry, PalletOverride, PlannedJob, DEFAULT_WEIGHT_CAPACITY,
};
use haulboard_domain::repository::BoardRepository;
use haulboard_domain::service::{
    capacity, group_by_location, ordering, CapacityState, PalletResolver, PalletSource, Preview,
    ResolvedPallets, DEFAULT_FALLBACK_PALLETS,
};
use haulboard_types::{BandThresholds, Error, Result, Run};

use super::board::{BoardRow, LorryBoard, PoolEntry, RunBoard};

/// Numeric policy the service applies, usually taken from `Config::policy`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningPolicy {
    pub fallback_pallets: u32,
    pub missing_pallets_fallback: u32,
    pub default_weight_capacity: f64,
    pub thresholds: BandThresholds,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        Self {
            fallback_pallets: DEFAULT_FALLBACK_PALLETS,
            missing_pallets_fallback: 1,
            default_weight_capacity: DEFAULT_WEIGHT_CAPACITY,
            thresholds: BandThresholds::default(),
        }
    }
}

pub struct PlanningService<'a, R> {
    repo: &'a R,
    policy: PlanningPolicy,
}

impl<'a, R: BoardRepository + 'a> PlanningService<'a, R> {
    pub fn new(repo: &'a R, policy: PlanningPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> &PlanningPolicy {
        &self.policy
    }

    fn resolver(&self) -> PalletResolver<'a> {
        PalletResolver::new(self.repo, self.repo, self.repo, self.policy.fallback_pallets)
    }

    fn require_lorry(&self, lorry_id: &str) -> Result<Lorry> {
        self.repo
            .find_lorry(lorry_id)?
            .ok_or_else(|| Error::LorryNotFound(lorry_id.to_string()))
    }

    fn require_active_consignment(&self, consignment_id: &str) -> Result<Consignment> {
        self.repo
            .find_consignment(consignment_id)?
            .filter(|c| c.is_active())
            .ok_or_else(|| Error::ConsignmentNotFound(consignment_id.to_string()))
    }

    // ---- pallets ------------------------------------------------------

    pub fn resolve_pallets(&self, consignment_id: &str) -> Result<ResolvedPallets> {
        self.resolver().resolve(consignment_id)
    }

    /// Record a manual pallet count and apply it to a live assignment
    pub fn set_pallet_override(&self, consignment_id: &str, pallets: i64) -> Result<ResolvedPallets> {
        let pallets = to_pallets(pallets)?;
        self.repo
            .find_consignment(consignment_id)?
            .ok_or_else(|| Error::ConsignmentNotFound(consignment_id.to_string()))?;

        let record = PalletOverride::new(consignment_id, pallets);
        let updated = self
            .repo
            .apply_override(consignment_id, Some(&record), pallets)?;
        info!(
            consignment_id,
            pallets,
            assigned = updated.is_some(),
            "pallet override set"
        );
        Ok(ResolvedPallets {
            pallets,
            source: PalletSource::Override,
        })
    }

    /// Drop a manual pallet count; the next source in precedence applies
    pub fn clear_pallet_override(&self, consignment_id: &str) -> Result<ResolvedPallets> {
        let resolved = self.resolver().resolve_ignoring_override(consignment_id)?;
        self.repo
            .apply_override(consignment_id, None, resolved.pallets)?;
        info!(
            consignment_id,
            pallets = resolved.pallets,
            "pallet override cleared"
        );
        Ok(resolved)
    }

    // ---- placement ----------------------------------------------------

    /// Put a consignment at the end of a lorry's Run 1
    pub fn assign(&self, consignment_id: &str, lorry_id: &str) -> Result<Assignment> {
        require_id("consignment", consignment_id)?;
        require_id("lorry", lorry_id)?;
        self.require_lorry(lorry_id)?;
        let consignment = self.require_active_consignment(consignment_id)?;

        if let Some(existing) = self.repo.find_assignment_for_consignment(consignment_id)? {
            return Err(Error::AlreadyAssigned {
                consignment_id: consignment_id.to_string(),
                lorry_id: existing.lorry_id,
            });
        }

        let resolved = self.resolve_pallets(consignment_id)?;
        let draft = Assignment {
            id: Uuid::new_v4().to_string(),
            lorry_id: lorry_id.to_string(),
            consignment_id: consignment_id.to_string(),
            effective_pallets: resolved.pallets,
            effective_weight: consignment.weight.unwrap_or(0.0).max(0.0),
            is_reload: false,
            sort_order: 0,
        };

        let stored = self.repo.insert_assignment(draft)?;
        info!(
            consignment_id,
            lorry_id,
            pallets = stored.effective_pallets,
            pallet_source = resolved.source.label(),
            "assigned"
        );
        Ok(stored)
    }

    /// Return a consignment to the unassigned pool
    pub fn unassign(&self, consignment_id: &str) -> Result<Assignment> {
        require_id("consignment", consignment_id)?;
        let removed = self
            .repo
            .remove_assignment_for_consignment(consignment_id)?
            .ok_or_else(|| Error::AssignmentNotFound(consignment_id.to_string()))?;
        info!(consignment_id, lorry_id = %removed.lorry_id, "unassigned");
        Ok(removed)
    }

    /// Replace the loading order of a lorry; all-or-nothing
    pub fn reorder(&self, lorry_id: &str, ordered_consignment_ids: &[String]) -> Result<Vec<Assignment>> {
        require_id("lorry", lorry_id)?;
        let list = self.repo.update_assignments(lorry_id, &mut |current: Vec<Assignment>| {
            ordering::reorder(lorry_id, current, ordered_consignment_ids)
        })?;
        info!(lorry_id, jobs = list.len(), "reordered");
        Ok(list)
    }

    /// Move one assignment to Run 2 (`true`) or back to Run 1 (`false`)
    pub fn set_reload_flag(&self, assignment_id: &str, is_reload: bool) -> Result<Assignment> {
        require_id("assignment", assignment_id)?;
        let assignment = self
            .repo
            .find_assignment(assignment_id)?
            .ok_or_else(|| Error::AssignmentNotFound(assignment_id.to_string()))?;

        let list = self
            .repo
            .update_assignments(&assignment.lorry_id, &mut |current: Vec<Assignment>| {
                ordering::set_reload_flag(current, assignment_id, is_reload)
            })?;

        let updated = list
            .into_iter()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| Error::AssignmentNotFound(assignment_id.to_string()))?;
        info!(
            assignment_id,
            lorry_id = %updated.lorry_id,
            run = updated.run().number(),
            "reload flag set"
        );
        Ok(updated)
    }

    /// Move every Run 1 job of a lorry to Run 2. Returns how many moved.
    pub fn mark_all_as_reload(&self, lorry_id: &str) -> Result<usize> {
        require_id("lorry", lorry_id)?;
        let mut moved = 0;
        self.repo
            .update_assignments(lorry_id, &mut |current: Vec<Assignment>| {
                let (list, count) = ordering::mark_all_as_reload(current);
                moved = count;
                Ok(list)
            })?;
        info!(lorry_id, moved, "marked all as reload");
        Ok(moved)
    }

    // ---- capacity -----------------------------------------------------

    pub fn capacity_state(&self, lorry_id: &str) -> Result<CapacityState> {
        let lorry = self.require_lorry(lorry_id)?;
        let assignments = self.repo.list_assignments(lorry_id)?;
        Ok(capacity::current_state(
            &lorry,
            &assignments,
            self.policy.default_weight_capacity,
        ))
    }

    /// Preview an arbitrary candidate load on a lorry's run
    pub fn preview_candidate(
        &self,
        lorry_id: &str,
        pallets: Option<i64>,
        weight: Option<f64>,
        run: Run,
    ) -> Result<Preview> {
        let pallets = pallets.map(to_pallets).transpose()?;
        let state = self.capacity_state(lorry_id)?;
        capacity::preview_add(
            &state,
            pallets,
            weight,
            run,
            self.policy.missing_pallets_fallback,
        )
    }

    /// Preview placing a consignment on a lorry's run.
    ///
    /// An assigned consignment is previewed as a move, so a job already on
    /// this lorry is not counted twice.
    pub fn preview_consignment(&self, lorry_id: &str, consignment_id: &str, run: Run) -> Result<Preview> {
        let state = self.capacity_state(lorry_id)?;

        if let Some(assignment) = self.repo.find_assignment_for_consignment(consignment_id)? {
            return capacity::preview_move(
                &state,
                &assignment,
                run,
                self.policy.missing_pallets_fallback,
            );
        }

        let consignment = self.require_active_consignment(consignment_id)?;
        let resolved = self.resolve_pallets(consignment_id)?;
        capacity::preview_add(
            &state,
            Some(resolved.pallets),
            consignment.weight,
            run,
            self.policy.missing_pallets_fallback,
        )
    }

    // ---- read models --------------------------------------------------

    pub fn lorry_board(&self, lorry_id: &str, plan_date: NaiveDate) -> Result<LorryBoard> {
        let lorry = self.require_lorry(lorry_id)?;
        self.build_board(lorry, plan_date)
    }

    /// Boards for all lorries, sorted by lorry name
    pub fn board(&self, plan_date: NaiveDate) -> Result<Vec<LorryBoard>> {
        let mut lorries = self.repo.find_all_lorries()?;
        lorries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        lorries
            .into_iter()
            .map(|lorry| self.build_board(lorry, plan_date))
            .collect()
    }

    fn build_board(&self, lorry: Lorry, plan_date: NaiveDate) -> Result<LorryBoard> {
        let assignments = self.repo.list_assignments(&lorry.id)?;
        let state = capacity::current_state(
            &lorry,
            &assignments,
            self.policy.default_weight_capacity,
        );

        let mut jobs = Vec::with_capacity(assignments.len());
        for assignment in ordering::sorted(assignments) {
            let consignment = self.repo.find_consignment(&assignment.consignment_id)?;
            if consignment.is_none() {
                warn!(
                    consignment_id = %assignment.consignment_id,
                    lorry_id = %lorry.id,
                    "assigned consignment is not in the store"
                );
            }
            jobs.push(PlannedJob {
                assignment,
                consignment,
            });
        }

        let registry = self.repo.find_all_locations()?;
        let locations = group_by_location(&jobs, &registry);

        let run_board = |run: Run| RunBoard {
            summary: state.summarize(run, &self.policy.thresholds),
            rows: jobs
                .iter()
                .filter(|job| job.assignment.run() == run)
                .map(|job| board_row(job, plan_date))
                .collect(),
        };
        let run1 = run_board(Run::Primary);
        let run2 = run_board(Run::Reload);

        Ok(LorryBoard {
            lorry,
            state,
            run1,
            run2,
            locations,
        })
    }

    /// Active consignments with no assignment, by ETA (unknown last) then id
    pub fn unassigned_pool(&self, plan_date: NaiveDate) -> Result<Vec<PoolEntry>> {
        let resolver = self.resolver();
        let mut entries = Vec::new();
        for consignment in self.repo.find_active_consignments()? {
            if self
                .repo
                .find_assignment_for_consignment(&consignment.id)?
                .is_some()
            {
                continue;
            }
            let pallets = resolver.resolve(&consignment.id)?;
            entries.push(PoolEntry {
                missing_pallets: pallets.pallets == 0 || consignment.awaiting_pallet_count(),
                eta_before_plan: consignment.eta_before(plan_date),
                pallets,
                consignment,
            });
        }

        // unknown ETA sorts last
        entries.sort_by(|a, b| {
            let by_eta = match (a.consignment.eta, b.consignment.eta) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_eta.then_with(|| a.consignment.id.cmp(&b.consignment.id))
        });
        Ok(entries)
    }
}

fn board_row(job: &PlannedJob, plan_date: NaiveDate) -> BoardRow {
    let eta_early = job
        .consignment
        .as_ref()
        .map(|c| c.eta_before(plan_date))
        .unwrap_or(false);
    let awaiting = job
        .consignment
        .as_ref()
        .map(Consignment::awaiting_pallet_count)
        .unwrap_or(false);

    BoardRow {
        displayed_as_reload: job.assignment.is_reload || eta_early,
        missing_pallets: job.assignment.effective_pallets == 0 || awaiting,
        assignment: job.assignment.clone(),
        consignment: job.consignment.clone(),
    }
}

fn require_id(what: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        Err(Error::InvalidInput(format!("{} id must not be blank", what)))
    } else {
        Ok(())
    }
}

fn to_pallets(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::InvalidInput(format!(
            "pallet count must be between 0 and {} (got {})",
            u32::MAX,
            value
        ))
    })
}
