//! Dual-run capacity model
//!
//! Usage is always derived from the live assignment list; nothing here is
//! stored. Run 1 and Run 2 are accounted independently and each gets the
//! lorry's full capacity.

use haulboard_types::{BandThresholds, CapacityBand, Error, Result, Run};
use serde::{Deserialize, Serialize};

use crate::model::{Assignment, Lorry};

/// Accumulated load of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLoad {
    pub used_pallets: u32,
    pub used_weight: f64,
    pub job_count: usize,
}

impl RunLoad {
    fn add(&mut self, pallets: u32, weight: f64) {
        self.used_pallets = self.used_pallets.saturating_add(pallets);
        self.used_weight += weight;
        self.job_count += 1;
    }

    fn remove(&mut self, pallets: u32, weight: f64) {
        self.used_pallets = self.used_pallets.saturating_sub(pallets);
        self.used_weight = (self.used_weight - weight).max(0.0);
        self.job_count = self.job_count.saturating_sub(1);
    }
}

/// Capacity state of one lorry across both runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityState {
    pub lorry_id: String,
    pub run1: RunLoad,
    pub run2: RunLoad,
    /// Declared pallet capacity, clamped to at least 1
    pub capacity_pallets: u32,
    pub capacity_weight: f64,
}

impl CapacityState {
    pub fn run(&self, run: Run) -> &RunLoad {
        match run {
            Run::Primary => &self.run1,
            Run::Reload => &self.run2,
        }
    }

    fn run_mut(&mut self, run: Run) -> &mut RunLoad {
        match run {
            Run::Primary => &mut self.run1,
            Run::Reload => &mut self.run2,
        }
    }

    fn exceeds(&self, pallets: u32, weight: f64) -> bool {
        pallets > self.capacity_pallets || weight > self.capacity_weight
    }

    pub fn is_over_capacity(&self, run: Run) -> bool {
        let load = self.run(run);
        self.exceeds(load.used_pallets, load.used_weight)
    }

    pub fn summarize(&self, run: Run, thresholds: &BandThresholds) -> RunSummary {
        let load = *self.run(run);
        let pallet_percent = fill_ratio(load.used_pallets as f64, self.capacity_pallets as f64);
        let weight_percent = fill_ratio(load.used_weight, self.capacity_weight);
        let band = CapacityBand::from_percent(
            raw_ratio(load.used_pallets as f64, self.capacity_pallets as f64),
            thresholds,
        )
        .max(CapacityBand::from_percent(
            raw_ratio(load.used_weight, self.capacity_weight),
            thresholds,
        ));

        RunSummary {
            run,
            load,
            pallet_percent,
            weight_percent,
            band,
            overflow_pallets: load.used_pallets.saturating_sub(self.capacity_pallets),
            overflow_weight: (load.used_weight - self.capacity_weight).max(0.0),
            over_capacity: self.is_over_capacity(run),
        }
    }
}

/// Display-ready figures for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: Run,
    pub load: RunLoad,
    /// Clamped to 0..=100
    pub pallet_percent: f64,
    /// Clamped to 0..=100
    pub weight_percent: f64,
    pub band: CapacityBand,
    pub overflow_pallets: u32,
    pub overflow_weight: f64,
    pub over_capacity: bool,
}

/// Projected state of a run if a job were placed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub run: Run,
    pub preview_pallets: u32,
    pub preview_weight: f64,
    pub would_exceed: bool,
    /// Clamped to 0..=100
    pub pallet_percent: f64,
    /// Clamped to 0..=100
    pub weight_percent: f64,
}

/// Sum a lorry's assignments into per-run load.
///
/// `assignments` are expected to belong to `lorry`.
pub fn current_state(
    lorry: &Lorry,
    assignments: &[Assignment],
    default_weight_capacity: f64,
) -> CapacityState {
    let mut state = CapacityState {
        lorry_id: lorry.id.clone(),
        run1: RunLoad::default(),
        run2: RunLoad::default(),
        capacity_pallets: lorry.effective_pallet_capacity(),
        capacity_weight: lorry.effective_weight_capacity(default_weight_capacity),
    };
    for a in assignments {
        state
            .run_mut(a.run())
            .add(a.effective_pallets, a.effective_weight);
    }
    state
}

/// Project adding a job to `target`. Never mutates anything.
///
/// A candidate with no or zero pallets counts as `missing_pallets_fallback`
/// pallets for the projection only.
pub fn preview_add(
    state: &CapacityState,
    candidate_pallets: Option<u32>,
    candidate_weight: Option<f64>,
    target: Run,
    missing_pallets_fallback: u32,
) -> Result<Preview> {
    let weight = validate_weight(candidate_weight)?;
    let pallets = projection_pallets(candidate_pallets, missing_pallets_fallback);

    let mut projected = *state.run(target);
    projected.add(pallets, weight);
    Ok(build_preview(state, target, &projected))
}

/// Project moving an existing assignment onto `target` of the lorry in `state`.
///
/// If the assignment already sits on this lorry its current contribution is
/// taken out first; a move within the same run changes nothing.
pub fn preview_move(
    state: &CapacityState,
    assignment: &Assignment,
    target: Run,
    missing_pallets_fallback: u32,
) -> Result<Preview> {
    if assignment.lorry_id == state.lorry_id && assignment.run() == target {
        validate_weight(Some(assignment.effective_weight))?;
        let current = *state.run(target);
        return Ok(build_preview(state, target, &current));
    }

    preview_add(
        &without(state, assignment),
        Some(assignment.effective_pallets),
        Some(assignment.effective_weight),
        target,
        missing_pallets_fallback,
    )
}

/// Remove an assignment's contribution from a state, e.g. before re-adding it
pub fn without(state: &CapacityState, assignment: &Assignment) -> CapacityState {
    let mut next = state.clone();
    if assignment.lorry_id == state.lorry_id {
        next.run_mut(assignment.run())
            .remove(assignment.effective_pallets, assignment.effective_weight);
    }
    next
}

/// Percentage of `capacity` used, clamped to 0..=100 for display
pub fn fill_ratio(used: f64, capacity: f64) -> f64 {
    raw_ratio(used, capacity).clamp(0.0, 100.0)
}

/// Unclamped percentage; overflow decisions use this, not `fill_ratio`
pub fn raw_ratio(used: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 || !capacity.is_finite() || !used.is_finite() {
        return 0.0;
    }
    used / capacity * 100.0
}

fn projection_pallets(pallets: Option<u32>, missing_pallets_fallback: u32) -> u32 {
    match pallets {
        Some(p) if p > 0 => p,
        _ => missing_pallets_fallback,
    }
}

fn validate_weight(weight: Option<f64>) -> Result<f64> {
    match weight {
        None => Ok(0.0),
        Some(w) if w.is_finite() && w >= 0.0 => Ok(w),
        Some(w) => Err(Error::InvalidInput(format!(
            "weight must be a finite, non-negative number (got {})",
            w
        ))),
    }
}

fn build_preview(state: &CapacityState, run: Run, projected: &RunLoad) -> Preview {
    Preview {
        run,
        preview_pallets: projected.used_pallets,
        preview_weight: projected.used_weight,
        would_exceed: state.exceeds(projected.used_pallets, projected.used_weight),
        pallet_percent: fill_ratio(projected.used_pallets as f64, state.capacity_pallets as f64),
        weight_percent: fill_ratio(projected.used_weight, state.capacity_weight),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_WEIGHT_CAPACITY;

    fn assignment(id: &str, pallets: u32, weight: f64, is_reload: bool, order: i64) -> Assignment {
        Assignment {
            id: format!("A-{}", id),
            lorry_id: "L1".to_string(),
            consignment_id: id.to_string(),
            effective_pallets: pallets,
            effective_weight: weight,
            is_reload,
            sort_order: order,
        }
    }

    fn lorry_26() -> Lorry {
        Lorry::new("L1", "Unit 1", 26)
    }

    #[test]
    fn test_current_state_splits_runs() {
        let jobs = vec![
            assignment("C1", 10, 4000.0, false, 0),
            assignment("C2", 14, 6000.0, false, 1),
            assignment("C3", 5, 1000.0, true, 2),
        ];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);
        assert_eq!(state.run1.used_pallets, 24);
        assert_eq!(state.run1.job_count, 2);
        assert!((state.run1.used_weight - 10_000.0).abs() < 0.01);
        assert_eq!(state.run2.used_pallets, 5);
        assert_eq!(state.capacity_weight, 24_000.0);
    }

    #[test]
    fn test_preview_overflows_run1_not_run2() {
        let jobs = vec![
            assignment("C1", 10, 0.0, false, 0),
            assignment("C2", 14, 0.0, false, 1),
        ];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);

        let p = preview_add(&state, Some(3), None, Run::Primary, 1).unwrap();
        assert_eq!(p.preview_pallets, 27);
        assert!(p.would_exceed);

        let p = preview_add(&state, Some(3), None, Run::Reload, 1).unwrap();
        assert_eq!(p.preview_pallets, 3);
        assert!(!p.would_exceed);
    }

    #[test]
    fn test_weight_alone_exceeds() {
        let state = current_state(&lorry_26(), &[], DEFAULT_WEIGHT_CAPACITY);
        let p = preview_add(&state, Some(1), Some(25_000.0), Run::Primary, 1).unwrap();
        assert!(p.would_exceed);
        assert!((p.weight_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exactly_full_is_not_overflow() {
        let jobs = vec![assignment("C1", 23, 0.0, false, 0)];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);
        let p = preview_add(&state, Some(3), None, Run::Primary, 1).unwrap();
        assert_eq!(p.preview_pallets, 26);
        assert!(!p.would_exceed);
        assert!((p.pallet_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_pallets_fallback_only_in_projection() {
        let state = current_state(&lorry_26(), &[], DEFAULT_WEIGHT_CAPACITY);
        let p = preview_add(&state, Some(0), None, Run::Primary, 2).unwrap();
        assert_eq!(p.preview_pallets, 2);
        let p = preview_add(&state, None, None, Run::Primary, 1).unwrap();
        assert_eq!(p.preview_pallets, 1);
    }

    #[test]
    fn test_preview_rejects_bad_weight() {
        let state = current_state(&lorry_26(), &[], DEFAULT_WEIGHT_CAPACITY);
        let err = preview_add(&state, Some(1), Some(-5.0), Run::Primary, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(preview_add(&state, Some(1), Some(f64::NAN), Run::Primary, 1).is_err());
    }

    #[test]
    fn test_preview_move_between_runs() {
        let jobs = vec![
            assignment("C1", 20, 0.0, false, 0),
            assignment("C2", 4, 0.0, false, 1),
            assignment("C3", 24, 0.0, true, 2),
        ];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);

        // C2 into Run 2: 24 + 4 = 28
        let p = preview_move(&state, &jobs[1], Run::Reload, 1).unwrap();
        assert_eq!(p.preview_pallets, 28);
        assert!(p.would_exceed);

        // C2 staying on Run 1 changes nothing
        let p = preview_move(&state, &jobs[1], Run::Primary, 1).unwrap();
        assert_eq!(p.preview_pallets, 24);
        assert!(!p.would_exceed);
    }

    #[test]
    fn test_preview_move_from_other_lorry_is_add() {
        let state = current_state(&lorry_26(), &[], DEFAULT_WEIGHT_CAPACITY);
        let mut other = assignment("C9", 6, 100.0, false, 0);
        other.lorry_id = "L2".to_string();
        let p = preview_move(&state, &other, Run::Primary, 1).unwrap();
        assert_eq!(p.preview_pallets, 6);
    }

    #[test]
    fn test_without_removes_contribution() {
        let jobs = vec![assignment("C1", 10, 500.0, true, 0)];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);
        let next = without(&state, &jobs[0]);
        assert_eq!(next.run2.used_pallets, 0);
        assert_eq!(next.run2.job_count, 0);
        assert_eq!(state.run2.used_pallets, 10);
    }

    #[test]
    fn test_fill_ratio_clamped_raw_not() {
        assert!((fill_ratio(30.0, 26.0) - 100.0).abs() < f64::EPSILON);
        assert!(raw_ratio(30.0, 26.0) > 100.0);
        assert_eq!(fill_ratio(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_summary_band_and_overflow() {
        let jobs = vec![assignment("C1", 28, 1000.0, false, 0)];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);
        let s = state.summarize(Run::Primary, &BandThresholds::default());
        assert_eq!(s.band, CapacityBand::Critical);
        assert_eq!(s.overflow_pallets, 2);
        assert!(s.over_capacity);
        assert!((s.pallet_percent - 100.0).abs() < f64::EPSILON);

        let s = state.summarize(Run::Reload, &BandThresholds::default());
        assert_eq!(s.band, CapacityBand::Nominal);
        assert!(!s.over_capacity);
    }

    #[test]
    fn test_summary_band_uses_worse_of_pallets_and_weight() {
        let jobs = vec![assignment("C1", 2, 20_000.0, false, 0)];
        let state = current_state(&lorry_26(), &jobs, DEFAULT_WEIGHT_CAPACITY);
        let s = state.summarize(Run::Primary, &BandThresholds::default());
        assert_eq!(s.band, CapacityBand::Warning);
    }
}
