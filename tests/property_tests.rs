//! Property-based tests for the fixed-point traversal using proptest.
//!
//! Random forests are built so that every manager has a smaller id than
//! its reports, which makes them acyclic by construction.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use proptest::sample::Index;

use cte_breakdown::error::HierarchyError;
use cte_breakdown::graph::integrity;
use cte_breakdown::graph::store::RelationStore;
use cte_breakdown::graph::traversal::FixedPointTraversal;
use cte_breakdown::types::{Employee, HierarchyRow};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Strategy to generate an acyclic forest of up to `max` employees with ids
/// `1..=n`. Employee 1 is always a root.
fn arb_forest(max: usize) -> impl Strategy<Value = Vec<Employee>> {
    prop::collection::vec((any::<bool>(), any::<Index>()), 0..max).prop_map(|slots| {
        slots
            .iter()
            .enumerate()
            .map(|(i, (is_root, pick))| {
                let id = i as i64 + 1;
                let manager_id = if i == 0 || *is_root {
                    None
                } else {
                    Some(pick.index(i) as i64 + 1)
                };
                Employee::new(id, format!("emp{id}"), manager_id)
            })
            .collect()
    })
}

/// Expected level for every employee, found by walking manager links.
fn expected_levels(employees: &[Employee]) -> HashMap<i64, u32> {
    let managers: HashMap<i64, Option<i64>> =
        employees.iter().map(|e| (e.id, e.manager_id)).collect();
    employees
        .iter()
        .map(|e| {
            let mut level = 1;
            let mut cur = e.manager_id;
            while let Some(m) = cur {
                level += 1;
                cur = managers[&m];
            }
            (e.id, level)
        })
        .collect()
}

fn load(employees: &[Employee]) -> RelationStore {
    RelationStore::with_employees(employees).expect("generated forests load cleanly")
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_employee_appears_once_at_its_depth(forest in arb_forest(40)) {
        let store = load(&forest);
        let t = FixedPointTraversal::new(&store).run().unwrap();
        let expected = expected_levels(&forest);

        prop_assert_eq!(t.rows().len(), forest.len());
        let ids: HashSet<i64> = t.rows().iter().map(|r| r.employee_id).collect();
        prop_assert_eq!(ids.len(), forest.len(), "an employee was visited twice");
        for row in t.rows() {
            prop_assert_eq!(row.level, expected[&row.employee_id]);
        }
    }

    #[test]
    fn output_is_sorted_by_level_then_id(forest in arb_forest(40)) {
        let store = load(&forest);
        let rows = FixedPointTraversal::new(&store).run().unwrap().rows().to_vec();
        let mut sorted = rows.clone();
        sorted.sort_by_key(HierarchyRow::sort_key);
        prop_assert_eq!(rows, sorted);
    }

    #[test]
    fn terminates_after_max_depth_levels(forest in arb_forest(40)) {
        let store = load(&forest);
        let t = FixedPointTraversal::new(&store).run().unwrap();
        let max_depth = expected_levels(&forest).values().copied().max().unwrap_or(0);

        prop_assert_eq!(t.depth(), max_depth);
        // One step per level plus the empty step that ends the loop, except
        // for an empty store where the anchor itself is empty.
        let expected_steps = if forest.is_empty() { 1 } else { max_depth as usize + 1 };
        prop_assert_eq!(t.steps().len(), expected_steps);
        prop_assert!(t.terminal_step().is_some());
    }

    #[test]
    fn unrolled_steps_match_recursive_cte(forest in arb_forest(40)) {
        let store = load(&forest);
        let traversal = FixedPointTraversal::new(&store);
        let unrolled = traversal.run().unwrap().rows().to_vec();
        prop_assert_eq!(unrolled, traversal.recursive_query().unwrap());
    }

    #[test]
    fn traversal_is_idempotent(forest in arb_forest(30)) {
        let store = load(&forest);
        let traversal = FixedPointTraversal::new(&store);
        prop_assert_eq!(traversal.run().unwrap(), traversal.run().unwrap());
    }

    #[test]
    fn generated_forests_pass_integrity_checks(forest in arb_forest(40)) {
        prop_assert!(integrity::check(&forest).is_ok());
    }

    #[test]
    fn dangling_subtrees_are_excluded(forest in arb_forest(30), extra in 1usize..5) {
        let base = forest.len() as i64;
        let mut rows = forest.clone();
        // A chain hanging off a manager that does not exist.
        for k in 0..extra as i64 {
            let id = base + 1 + k;
            let manager = if k == 0 { 10_000 } else { id - 1 };
            rows.push(Employee::new(id, format!("orphan{id}"), Some(manager)));
        }

        let store = load(&rows);
        let t = FixedPointTraversal::new(&store).run().unwrap();
        prop_assert_eq!(t.rows().len(), forest.len());
        prop_assert!(t.rows().iter().all(|r| r.employee_id <= base));

        let is_dangling = matches!(
            integrity::check(&rows),
            Err(HierarchyError::DanglingReference { manager_id: 10_000, .. })
        );
        prop_assert!(is_dangling);
    }
}
