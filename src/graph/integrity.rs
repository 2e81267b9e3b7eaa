//! Integrity checks for the employee relation.
//!
//! The traversal itself tolerates bad rows by leaving them out. These
//! checks run in strict mode and turn each kind of bad row into an error:
//! invalid rows first, then dangling manager references, then cycles.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{HierarchyError, Result};
use crate::graph::store::RelationStore;
use crate::types::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnPath,
    Done,
}

/// Rows that are malformed on their own: non-positive id, blank name, or a
/// manager reference to themselves.
pub fn invalid_rows(employees: &[Employee]) -> Vec<HierarchyError> {
    employees
        .iter()
        .filter_map(|e| {
            let reason = if e.id <= 0 {
                "id must be positive"
            } else if e.name.trim().is_empty() {
                "name must not be blank"
            } else if e.manager_id == Some(e.id) {
                "employee cannot manage themselves"
            } else {
                return None;
            };
            Some(HierarchyError::Validation {
                id: e.id,
                reason: reason.to_string(),
            })
        })
        .collect()
}

/// `(employee_id, manager_id)` pairs whose manager does not exist.
pub fn dangling_references(employees: &[Employee]) -> Vec<(i64, i64)> {
    let known: HashSet<i64> = employees.iter().map(|e| e.id).collect();
    let mut dangling: Vec<(i64, i64)> = employees
        .iter()
        .filter_map(|e| e.manager_id.map(|m| (e.id, m)))
        .filter(|(_, m)| !known.contains(m))
        .collect();
    dangling.sort_unstable();
    dangling
}

/// Every manager cycle, each listed from its smallest id along the
/// employee -> manager direction.
///
/// Each employee has at most one manager, so following manager links from
/// any start either reaches a root, a missing manager, an already explored
/// chain, or loops back onto the current path.
pub fn find_cycles(employees: &[Employee]) -> Vec<Vec<i64>> {
    let managers: BTreeMap<i64, Option<i64>> =
        employees.iter().map(|e| (e.id, e.manager_id)).collect();
    let mut state: HashMap<i64, Visit> = HashMap::new();
    let mut cycles = Vec::new();

    for &start in managers.keys() {
        let mut path: Vec<i64> = Vec::new();
        let mut cur = Some(start);

        while let Some(id) = cur {
            match state.get(&id) {
                Some(Visit::Done) => break,
                Some(Visit::OnPath) => {
                    if let Some(pos) = path.iter().position(|&p| p == id) {
                        cycles.push(rotate_to_min(&path[pos..]));
                    }
                    break;
                }
                None => {}
            }
            state.insert(id, Visit::OnPath);
            path.push(id);
            cur = managers
                .get(&id)
                .copied()
                .flatten()
                .filter(|m| managers.contains_key(m));
        }

        for id in path {
            state.insert(id, Visit::Done);
        }
    }

    cycles
}

fn rotate_to_min(cycle: &[i64]) -> Vec<i64> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[pivot..].iter().chain(&cycle[..pivot]).copied().collect()
}

/// Fail on the first integrity problem, in the order
/// validation, dangling reference, cycle.
pub fn check(employees: &[Employee]) -> Result<()> {
    if let Some(err) = invalid_rows(employees).into_iter().next() {
        return Err(err);
    }
    if let Some(&(id, manager_id)) = dangling_references(employees).first() {
        return Err(HierarchyError::DanglingReference { id, manager_id });
    }
    if let Some(ids) = find_cycles(employees).into_iter().next() {
        return Err(HierarchyError::CycleDetected { ids });
    }
    Ok(())
}

/// [`check`] against the rows already loaded into `store`.
pub fn check_store(store: &RelationStore) -> Result<()> {
    let employees = store.employees()?;
    check(&employees)?;
    tracing::debug!(rows = employees.len(), "integrity check passed");
    Ok(())
}
