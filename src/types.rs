//! Core domain types: the employee relation and its level-annotated closure.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// One row of the `employees` relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// `None` marks a root (no manager).
    #[serde(default)]
    pub manager_id: Option<i64>,
}

impl Employee {
    pub fn new(id: i64, name: impl Into<String>, manager_id: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            manager_id,
        }
    }
}

// ---------------------------------------------------------------------------
// HierarchyRow
// ---------------------------------------------------------------------------

/// An `(employee_id, manager_id, level)` triple produced by the traversal.
///
/// `level` is 1 for roots and 1 + the manager's level otherwise. It is
/// derived during traversal and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HierarchyRow {
    pub employee_id: i64,
    pub manager_id: Option<i64>,
    pub level: u32,
}

impl HierarchyRow {
    /// Ordering key used for the final hierarchy: level first, then id.
    pub fn sort_key(&self) -> (u32, i64) {
        (self.level, self.employee_id)
    }
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

/// The built-in seven-person organisation: Alice at the top, Bob and
/// Charlie reporting to her, and so on down to Grace at level 4.
pub fn sample_employees() -> Vec<Employee> {
    vec![
        Employee::new(1, "Alice", None),
        Employee::new(2, "Bob", Some(1)),
        Employee::new(3, "Charlie", Some(1)),
        Employee::new(4, "David", Some(2)),
        Employee::new(5, "Eve", Some(2)),
        Employee::new(6, "Frank", Some(3)),
        Employee::new(7, "Grace", Some(4)),
    ]
}
