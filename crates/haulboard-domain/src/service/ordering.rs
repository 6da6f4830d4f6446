//! Per-lorry job ordering and run transitions
//!
//! A lorry's assignments form one sequence ordered by `sort_order`;
//! Run 1 and Run 2 are read by partitioning that sequence on `is_reload`.
//! Positions are unique per lorry, which also makes them unique per run.
//!
//! Every function here takes the current list by value and returns the
//! full replacement list, so a caller can store the result in one step or
//! discard it on error.

use std::collections::HashSet;

use haulboard_types::{Error, Result};

use crate::model::Assignment;

/// Position one past the current last job of the lorry
pub fn next_sort_order(assignments: &[Assignment]) -> i64 {
    assignments
        .iter()
        .map(|a| a.sort_order)
        .max()
        .map(|max| max + 1)
        .unwrap_or(0)
}

/// Sort a lorry's list by position
pub fn sorted(mut assignments: Vec<Assignment>) -> Vec<Assignment> {
    assignments.sort_by_key(|a| a.sort_order);
    assignments
}

/// Place a new assignment at the end of Run 1 of its lorry
pub fn append_to_primary(
    mut current: Vec<Assignment>,
    mut assignment: Assignment,
) -> Result<Vec<Assignment>> {
    if current
        .iter()
        .any(|a| a.consignment_id == assignment.consignment_id)
    {
        return Err(Error::AlreadyAssigned {
            consignment_id: assignment.consignment_id,
            lorry_id: assignment.lorry_id,
        });
    }
    assignment.is_reload = false;
    assignment.sort_order = next_sort_order(&current);
    current.push(assignment);
    Ok(current)
}

/// Replace the order of exactly the jobs on the lorry.
///
/// `ordered_consignment_ids` must name every current job once and nothing
/// else. Run flags are kept; positions are renumbered from 0.
pub fn reorder(
    lorry_id: &str,
    current: Vec<Assignment>,
    ordered_consignment_ids: &[String],
) -> Result<Vec<Assignment>> {
    let mut seen = HashSet::new();
    for id in ordered_consignment_ids {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "reorder contains a blank consignment id".to_string(),
            ));
        }
        if !seen.insert(id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "consignment {} appears more than once in reorder",
                id
            )));
        }
    }

    let current_ids: HashSet<&str> = current.iter().map(|a| a.consignment_id.as_str()).collect();

    let unknown: Vec<&str> = seen.difference(&current_ids).copied().collect();
    let missing: Vec<&str> = current_ids.difference(&seen).copied().collect();
    if !unknown.is_empty() || !missing.is_empty() {
        let mut detail = Vec::new();
        if !missing.is_empty() {
            detail.push(format!("missing {}", sorted_join(missing)));
        }
        if !unknown.is_empty() {
            detail.push(format!("not on lorry {}", sorted_join(unknown)));
        }
        return Err(Error::ReorderMismatch {
            lorry_id: lorry_id.to_string(),
            detail: detail.join("; "),
        });
    }

    let mut remaining = current;
    let mut reordered = Vec::with_capacity(remaining.len());
    for (position, id) in ordered_consignment_ids.iter().enumerate() {
        let index = remaining
            .iter()
            .position(|a| &a.consignment_id == id)
            .ok_or_else(|| Error::OrderingViolation(format!("lost consignment {}", id)))?;
        let mut a = remaining.swap_remove(index);
        a.sort_order = position as i64;
        reordered.push(a);
    }
    Ok(reordered)
}

/// Move one assignment between runs.
///
/// The job goes to the end of the destination run. Setting the flag it
/// already has is a no-op.
pub fn set_reload_flag(
    current: Vec<Assignment>,
    assignment_id: &str,
    is_reload: bool,
) -> Result<Vec<Assignment>> {
    let next = next_sort_order(&current);
    let mut current = current;
    let target = current
        .iter_mut()
        .find(|a| a.id == assignment_id)
        .ok_or_else(|| Error::AssignmentNotFound(assignment_id.to_string()))?;

    if target.is_reload != is_reload {
        target.is_reload = is_reload;
        target.sort_order = next;
    }
    Ok(sorted(current))
}

/// Move every Run 1 job to the end of Run 2, keeping their relative order.
///
/// Returns the new list and how many jobs moved. Existing Run 2 jobs are
/// untouched.
pub fn mark_all_as_reload(current: Vec<Assignment>) -> (Vec<Assignment>, usize) {
    let mut current = sorted(current);
    let mut next = next_sort_order(&current);
    let mut moved = 0;
    for a in current.iter_mut().filter(|a| !a.is_reload) {
        a.is_reload = true;
        a.sort_order = next;
        next += 1;
        moved += 1;
    }
    (sorted(current), moved)
}

/// Check the ordering invariants of one lorry's list
pub fn check_invariants(lorry_id: &str, assignments: &[Assignment]) -> Result<()> {
    let mut positions = HashSet::new();
    let mut consignments = HashSet::new();
    let mut ids = HashSet::new();
    for a in assignments {
        if a.lorry_id != lorry_id {
            return Err(Error::OrderingViolation(format!(
                "assignment {} belongs to lorry {}, not {}",
                a.id, a.lorry_id, lorry_id
            )));
        }
        if !positions.insert(a.sort_order) {
            return Err(Error::OrderingViolation(format!(
                "duplicate position {} on lorry {}",
                a.sort_order, lorry_id
            )));
        }
        if !consignments.insert(a.consignment_id.as_str()) {
            return Err(Error::OrderingViolation(format!(
                "consignment {} appears twice on lorry {}",
                a.consignment_id, lorry_id
            )));
        }
        if !ids.insert(a.id.as_str()) {
            return Err(Error::OrderingViolation(format!(
                "duplicate assignment id {}",
                a.id
            )));
        }
    }
    Ok(())
}

fn sorted_join(mut ids: Vec<&str>) -> String {
    ids.sort_unstable();
    ids.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulboard_types::Run;

    fn run_order(list: &[Assignment], run: Run) -> Vec<&Assignment> {
        let mut jobs: Vec<&Assignment> = list.iter().filter(|a| a.run() == run).collect();
        jobs.sort_by_key(|a| a.sort_order);
        jobs
    }

    fn job(consignment: &str, is_reload: bool, order: i64) -> Assignment {
        Assignment {
            id: format!("A-{}", consignment),
            lorry_id: "L1".to_string(),
            consignment_id: consignment.to_string(),
            effective_pallets: 1,
            effective_weight: 0.0,
            is_reload,
            sort_order: order,
        }
    }

    fn ids(list: &[Assignment]) -> Vec<&str> {
        list.iter().map(|a| a.consignment_id.as_str()).collect()
    }

    fn abc() -> Vec<Assignment> {
        vec![job("A", false, 0), job("B", false, 1), job("C", false, 2)]
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_append_goes_to_end_of_run1() {
        let list = vec![job("A", false, 3), job("B", true, 7)];
        let list = append_to_primary(list, job("C", true, 0)).unwrap();
        let c = list.iter().find(|a| a.consignment_id == "C").unwrap();
        assert!(!c.is_reload);
        assert_eq!(c.sort_order, 8);
        let primary: Vec<&str> = run_order(&list, Run::Primary)
            .iter()
            .map(|a| a.consignment_id.as_str())
            .collect();
        assert_eq!(primary, vec!["A", "C"]);
    }

    #[test]
    fn test_append_rejects_duplicate() {
        let err = append_to_primary(abc(), job("B", false, 0)).unwrap_err();
        assert!(matches!(err, Error::AlreadyAssigned { .. }));
    }

    #[test]
    fn test_reorder() {
        let list = reorder("L1", abc(), &strings(&["C", "A", "B"])).unwrap();
        assert_eq!(ids(&sorted(list)), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_missing_id_fails() {
        let err = reorder("L1", abc(), &strings(&["C", "A"])).unwrap_err();
        match err {
            Error::ReorderMismatch { detail, .. } => assert!(detail.contains("missing B")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reorder_unknown_id_fails() {
        let err = reorder("L1", abc(), &strings(&["C", "A", "B", "Z"])).unwrap_err();
        match err {
            Error::ReorderMismatch { detail, .. } => assert!(detail.contains("Z")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reorder_duplicate_is_invalid_input() {
        let err = reorder("L1", abc(), &strings(&["A", "A", "B", "C"])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_reorder_keeps_run_flags() {
        let list = vec![job("A", false, 0), job("B", true, 1), job("C", false, 2)];
        let list = reorder("L1", list, &strings(&["B", "C", "A"])).unwrap();
        let primary: Vec<&str> = run_order(&list, Run::Primary)
            .iter()
            .map(|a| a.consignment_id.as_str())
            .collect();
        assert_eq!(primary, vec!["C", "A"]);
        assert!(list.iter().find(|a| a.consignment_id == "B").unwrap().is_reload);
    }

    #[test]
    fn test_set_reload_flag_moves_to_end_of_run2() {
        let list = vec![job("A", false, 0), job("B", true, 1), job("C", false, 2)];
        let list = set_reload_flag(list, "A-A", true).unwrap();
        let reload: Vec<&str> = run_order(&list, Run::Reload)
            .iter()
            .map(|a| a.consignment_id.as_str())
            .collect();
        assert_eq!(reload, vec!["B", "A"]);
        check_invariants("L1", &list).unwrap();
    }

    #[test]
    fn test_set_reload_flag_same_value_is_noop() {
        let list = set_reload_flag(abc(), "A-B", false).unwrap();
        assert_eq!(list, abc());
    }

    #[test]
    fn test_set_reload_flag_unknown_assignment() {
        let err = set_reload_flag(abc(), "A-Z", true).unwrap_err();
        assert!(matches!(err, Error::AssignmentNotFound(_)));
    }

    #[test]
    fn test_mark_all_as_reload_is_union() {
        let list = vec![
            job("A", false, 0),
            job("R", true, 1),
            job("B", false, 2),
        ];
        let (list, moved) = mark_all_as_reload(list);
        assert_eq!(moved, 2);
        assert!(run_order(&list, Run::Primary).is_empty());
        let reload: Vec<&str> = run_order(&list, Run::Reload)
            .iter()
            .map(|a| a.consignment_id.as_str())
            .collect();
        assert_eq!(reload, vec!["R", "A", "B"]);
        check_invariants("L1", &list).unwrap();
    }

    #[test]
    fn test_check_invariants_detects_duplicates() {
        let list = vec![job("A", false, 0), job("B", true, 0)];
        assert!(check_invariants("L1", &list).is_err());

        let list = vec![job("A", false, 0), job("A", true, 1)];
        assert!(check_invariants("L1", &list).is_err());

        assert!(check_invariants("L2", &abc()).is_err());
        assert!(check_invariants("L1", &abc()).is_ok());
    }

    #[test]
    fn test_gap_tolerant_positions() {
        let list = vec![job("A", false, 10), job("B", false, 40)];
        assert_eq!(next_sort_order(&list), 41);
        assert_eq!(next_sort_order(&[]), 0);
    }
}
