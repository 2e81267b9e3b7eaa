//! Fixed-point traversal of the manager hierarchy.
//!
//! [`FixedPointTraversal::run`] unrolls the recursive CTE by hand: the
//! anchor step selects the roots, then each recursion step selects the
//! employees managed by the previous frontier, until a step comes back
//! empty. [`FixedPointTraversal::recursive_query`] hands the same work to
//! SQLite's own `WITH RECURSIVE` evaluator for comparison.

use crate::error::Result;
use crate::graph::store::{RelationStore, ROOTS_SQL};
use crate::types::HierarchyRow;

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

/// The declarative equivalent of [`FixedPointTraversal::run`].
pub const RECURSIVE_HIERARCHY_SQL: &str = "\
WITH RECURSIVE employee_hierarchy AS (
    -- ANCHOR: employees without a manager
    SELECT employee_id, manager_id, 1 AS level
    FROM employees
    WHERE manager_id IS NULL
    UNION ALL
    -- RECURSIVE PART: repeated until it yields no rows
    SELECT e.employee_id, e.manager_id, eh.level + 1
    FROM employees e
    JOIN employee_hierarchy eh ON e.manager_id = eh.employee_id
)
SELECT employee_id, manager_id, level
FROM employee_hierarchy
ORDER BY level, employee_id";

/// SQL text for one unrolled step, with the frontier ids inlined.
///
/// Level 1 is the anchor and ignores `manager_ids`.
pub fn step_sql(level: u32, manager_ids: &[i64]) -> String {
    if level <= 1 {
        return ROOTS_SQL.to_string();
    }
    let ids = manager_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT e.employee_id, e.manager_id, {level} AS level\n\
         FROM employees e\n\
         WHERE e.manager_id IN ({ids})\n\
         ORDER BY e.employee_id"
    )
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One iteration of the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub level: u32,
    /// Frontier ids this step expanded. Empty for the anchor.
    pub manager_ids: Vec<i64>,
    pub rows: Vec<HierarchyRow>,
}

impl Step {
    pub fn is_anchor(&self) -> bool {
        self.level == 1
    }

    /// True for the step that produced nothing and ended the loop.
    pub fn is_fixed_point(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sql(&self) -> String {
        step_sql(self.level, &self.manager_ids)
    }
}

/// The outcome of a traversal: every step in order, plus the combined
/// hierarchy sorted by `(level, employee_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    steps: Vec<Step>,
    rows: Vec<HierarchyRow>,
}

impl Traversal {
    /// All steps, ending with the empty fixed-point step.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Steps that produced rows.
    pub fn productive_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| !s.is_fixed_point())
    }

    /// The empty step that terminated the loop.
    pub fn terminal_step(&self) -> Option<&Step> {
        self.steps.last().filter(|s| s.is_fixed_point())
    }

    pub fn rows(&self) -> &[HierarchyRow] {
        &self.rows
    }

    /// Number of non-empty levels; 0 for an empty store.
    pub fn depth(&self) -> u32 {
        self.productive_steps().count() as u32
    }
}

// ---------------------------------------------------------------------------
// FixedPointTraversal
// ---------------------------------------------------------------------------

/// Level-by-level expansion of the hierarchy from its roots.
pub struct FixedPointTraversal<'a> {
    store: &'a RelationStore,
}

impl<'a> FixedPointTraversal<'a> {
    /// Create a new traversal bound to the given store.
    pub fn new(store: &'a RelationStore) -> Self {
        Self { store }
    }

    // -------------------------------------------------------------------
    // run
    // -------------------------------------------------------------------

    /// Expand frontiers until one comes back empty.
    ///
    /// Every employee has at most one manager, so frontiers are disjoint
    /// and a cycle can never be entered from a root. Employees whose chain
    /// never reaches a root are left out.
    pub fn run(&self) -> Result<Traversal> {
        let mut level = 1;
        let anchor = self.store.roots()?;
        tracing::debug!(level, found = anchor.len(), "anchor step");

        let mut steps = vec![Step {
            level,
            manager_ids: Vec::new(),
            rows: anchor.clone(),
        }];
        let mut frontier = anchor;

        while !frontier.is_empty() {
            let ids: Vec<i64> = frontier.iter().map(|r| r.employee_id).collect();
            level += 1;
            let next: Vec<HierarchyRow> = self
                .store
                .children_of(&ids)?
                .into_iter()
                .map(|(employee_id, manager_id)| HierarchyRow {
                    employee_id,
                    manager_id: Some(manager_id),
                    level,
                })
                .collect();
            tracing::debug!(level, found = next.len(), "recursion step");

            steps.push(Step {
                level,
                manager_ids: ids,
                rows: next.clone(),
            });
            frontier = next;
        }

        let mut rows: Vec<HierarchyRow> = steps
            .iter()
            .flat_map(|s| s.rows.iter().copied())
            .collect();
        rows.sort_by_key(HierarchyRow::sort_key);

        let total = self.store.len()?;
        if rows.len() < total {
            tracing::warn!(
                unreachable = total - rows.len(),
                "some employees are not reachable from any root and were excluded"
            );
        }

        Ok(Traversal { steps, rows })
    }

    // -------------------------------------------------------------------
    // recursive_query
    // -------------------------------------------------------------------

    /// Run [`RECURSIVE_HIERARCHY_SQL`] and return its rows.
    pub fn recursive_query(&self) -> Result<Vec<HierarchyRow>> {
        // Go through the store so an unloaded store still reports NotLoaded.
        self.store.len()?;
        let mut stmt = self.store.conn.prepare_cached(RECURSIVE_HIERARCHY_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok(HierarchyRow {
                employee_id: row.get(0)?,
                manager_id: row.get(1)?,
                level: row.get(2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HierarchyError;
    use crate::types::{sample_employees, Employee};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn sample_store() -> RelationStore {
        RelationStore::with_employees(&sample_employees()).unwrap()
    }

    fn levels(t: &Traversal) -> Vec<(i64, u32)> {
        t.rows().iter().map(|r| (r.employee_id, r.level)).collect()
    }

    #[test]
    fn sample_levels() {
        let store = sample_store();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        assert_eq!(
            levels(&t),
            vec![(1, 1), (2, 2), (3, 2), (4, 3), (5, 3), (6, 3), (7, 4)]
        );
        assert_eq!(t.depth(), 4);
    }

    #[test_case(1, &[] ; "anchor")]
    #[test_case(2, &[1] ; "first recursion")]
    #[test_case(3, &[2, 3] ; "second recursion")]
    #[test_case(4, &[4, 5, 6] ; "third recursion")]
    #[test_case(5, &[7] ; "fixed point")]
    fn sample_step_frontiers(level: u32, expected: &[i64]) {
        let store = sample_store();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        let step = &t.steps()[(level - 1) as usize];
        assert_eq!(step.level, level);
        assert_eq!(step.manager_ids, expected);
    }

    #[test]
    fn last_step_is_the_empty_fixed_point() {
        let store = sample_store();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        assert_eq!(t.steps().len(), 5);
        let terminal = t.terminal_step().unwrap();
        assert_eq!(terminal.level, 5);
        assert!(terminal.rows.is_empty());
        assert_eq!(t.productive_steps().count(), 4);
    }

    #[test]
    fn empty_store_yields_nothing() {
        let store = RelationStore::with_employees(&[]).unwrap();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        assert!(t.rows().is_empty());
        assert_eq!(t.depth(), 0);
        assert_eq!(t.steps().len(), 1);
        assert!(t.terminal_step().unwrap().is_anchor());
    }

    #[test]
    fn unloaded_store_is_an_error() {
        let store = RelationStore::new().unwrap();
        let traversal = FixedPointTraversal::new(&store);
        assert!(matches!(traversal.run(), Err(HierarchyError::NotLoaded)));
        assert!(matches!(
            traversal.recursive_query(),
            Err(HierarchyError::NotLoaded)
        ));
    }

    #[test]
    fn running_twice_is_identical() {
        let store = sample_store();
        let traversal = FixedPointTraversal::new(&store);
        assert_eq!(traversal.run().unwrap(), traversal.run().unwrap());
    }

    #[test]
    fn matches_recursive_cte() {
        let store = sample_store();
        let traversal = FixedPointTraversal::new(&store);
        let unrolled = traversal.run().unwrap().rows().to_vec();
        assert_eq!(unrolled, traversal.recursive_query().unwrap());
    }

    #[test]
    fn dangling_manager_is_excluded() {
        let mut rows = sample_employees();
        rows.push(Employee::new(8, "Heidi", Some(99)));
        rows.push(Employee::new(9, "Ivan", Some(8)));
        let store = RelationStore::with_employees(&rows).unwrap();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        assert_eq!(t.rows().len(), 7);
        assert!(t.rows().iter().all(|r| r.employee_id < 8));
    }

    #[test]
    fn cycle_is_excluded_and_terminates() {
        let mut rows = sample_employees();
        rows.push(Employee::new(10, "Judy", Some(11)));
        rows.push(Employee::new(11, "Ken", Some(10)));
        rows.push(Employee::new(12, "Lou", Some(12)));
        let store = RelationStore::with_employees(&rows).unwrap();
        let traversal = FixedPointTraversal::new(&store);
        let t = traversal.run().unwrap();
        assert_eq!(t.rows().len(), 7);
        assert_eq!(traversal.recursive_query().unwrap(), t.rows());
    }

    #[test]
    fn wide_frontier_is_expanded_in_full() {
        let fanout = 40_000;
        let mut rows = vec![Employee::new(1, "Root", None)];
        rows.extend((2..=fanout).map(|id| Employee::new(id, format!("r{id}"), Some(1))));
        rows.push(Employee::new(fanout + 1, "Grandchild", Some(fanout)));
        let store = RelationStore::with_employees(&rows).unwrap();

        let traversal = FixedPointTraversal::new(&store);
        let t = traversal.run().unwrap();
        assert_eq!(t.rows().len(), rows.len());
        assert_eq!(t.depth(), 3);
        assert_eq!(t.steps()[2].rows.len(), 1);
        assert_eq!(t.steps()[2].manager_ids.len(), (fanout - 1) as usize);
        assert_eq!(
            t.rows().last(),
            Some(&HierarchyRow {
                employee_id: fanout + 1,
                manager_id: Some(fanout),
                level: 3,
            })
        );
        assert_eq!(traversal.recursive_query().unwrap(), t.rows());
    }

    #[test]
    fn multi_root_forest() {
        let store = RelationStore::with_employees(&[
            Employee::new(1, "A", None),
            Employee::new(2, "B", None),
            Employee::new(3, "C", Some(2)),
            Employee::new(4, "D", Some(1)),
            Employee::new(5, "E", Some(3)),
        ])
        .unwrap();
        let t = FixedPointTraversal::new(&store).run().unwrap();
        assert_eq!(levels(&t), vec![(1, 1), (2, 1), (3, 2), (4, 2), (5, 3)]);
    }

    #[test]
    fn step_sql_inlines_frontier_ids() {
        let sql = step_sql(3, &[2, 3]);
        assert!(sql.contains("3 AS level"));
        assert!(sql.contains("IN (2, 3)"));
        assert_eq!(step_sql(1, &[]), ROOTS_SQL);
    }
}
