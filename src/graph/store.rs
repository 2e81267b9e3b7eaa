//! SQLite-backed relation store for the employee hierarchy.
//!
//! Uses `rusqlite` with `prepare_cached` for statement reuse. The store is
//! populated once with [`RelationStore::load`] and is read-only afterwards.

use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};

use crate::db::schema::initialize_database;
use crate::error::{HierarchyError, Result};
use crate::types::{Employee, HierarchyRow};

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

const INSERT_EMPLOYEE_SQL: &str = "\
INSERT INTO employees (employee_id, name, manager_id)
VALUES (?1, ?2, ?3)";

const SELECT_EMPLOYEES_SQL: &str = "\
SELECT employee_id, name, manager_id
FROM employees
ORDER BY employee_id";

pub(crate) const ROOTS_SQL: &str = "\
SELECT employee_id, manager_id, 1 AS level
FROM employees
WHERE manager_id IS NULL
ORDER BY employee_id";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM employees";

/// Most manager ids bound into one child lookup. Wider frontiers are split
/// so a statement stays well under SQLite's bound-variable limit.
pub(crate) const MAX_IDS_PER_QUERY: usize = 500;

/// Build the `IN (?, ?, …)` child lookup for `n` manager ids.
fn children_sql(n: usize) -> String {
    let placeholders = vec!["?"; n].join(", ");
    format!(
        "SELECT employee_id, manager_id FROM employees \
         WHERE manager_id IN ({placeholders}) ORDER BY employee_id"
    )
}

fn row_to_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get("employee_id")?,
        name: row.get("name")?,
        manager_id: row.get("manager_id")?,
    })
}

// ---------------------------------------------------------------------------
// RelationStore
// ---------------------------------------------------------------------------

/// Typed wrapper around the in-memory `employees` table.
///
/// Every query other than [`load`](Self::load) fails with
/// [`HierarchyError::NotLoaded`] until the store has been populated.
pub struct RelationStore {
    pub conn: Connection,
    loaded: bool,
}

impl std::fmt::Debug for RelationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationStore")
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl RelationStore {
    /// Open an in-memory database with the schema applied.
    pub fn new() -> Result<Self> {
        Ok(Self::from_connection(initialize_database(":memory:")?))
    }

    /// Wrap an already-open connection. The caller is responsible for the
    /// schema being present (see [`initialize_database`]).
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            loaded: false,
        }
    }

    /// Open a store and load `rows` in one go.
    pub fn with_employees(rows: &[Employee]) -> Result<Self> {
        let mut store = Self::new()?;
        store.load(rows)?;
        Ok(store)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(HierarchyError::NotLoaded)
        }
    }

    // -------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------

    /// Insert `rows` inside a single transaction and mark the store loaded.
    ///
    /// A duplicate id aborts the whole batch with
    /// [`HierarchyError::DuplicateId`]; nothing from the batch is kept.
    pub fn load(&mut self, rows: &[Employee]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_EMPLOYEE_SQL)?;
            for e in rows {
                stmt.execute(params![e.id, e.name, e.manager_id])
                    .map_err(|err| match err {
                        rusqlite::Error::SqliteFailure(ref f, _)
                            if f.code == ErrorCode::ConstraintViolation =>
                        {
                            HierarchyError::DuplicateId(e.id)
                        }
                        other => other.into(),
                    })?;
            }
        }
        tx.commit()?;
        self.loaded = true;
        tracing::info!(rows = rows.len(), "loaded employees relation");
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Every employee ordered by id.
    pub fn employees(&self) -> Result<Vec<Employee>> {
        self.ensure_loaded()?;
        let mut stmt = self.conn.prepare_cached(SELECT_EMPLOYEES_SQL)?;
        let rows = stmt.query_map([], row_to_employee)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Number of stored employees.
    pub fn len(&self) -> Result<usize> {
        self.ensure_loaded()?;
        let count: i64 = self.conn.query_row(COUNT_SQL, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Employees without a manager, tagged level 1, ordered by id.
    pub fn roots(&self) -> Result<Vec<HierarchyRow>> {
        self.ensure_loaded()?;
        let mut stmt = self.conn.prepare_cached(ROOTS_SQL)?;
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

    /// Employees whose manager is one of `manager_ids`, as
    /// `(employee_id, manager_id)` pairs ordered by employee id.
    ///
    /// An empty `manager_ids` yields an empty result without a query. Ids are
    /// looked up [`MAX_IDS_PER_QUERY`] at a time.
    pub fn children_of(&self, manager_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        self.ensure_loaded()?;
        let mut children = Vec::new();
        for chunk in manager_ids.chunks(MAX_IDS_PER_QUERY) {
            let sql = children_sql(chunk.len());
            let mut stmt = self.conn.prepare_cached(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            for row in rows {
                children.push(row?);
            }
        }
        if manager_ids.len() > MAX_IDS_PER_QUERY {
            children.sort_unstable_by_key(|&(id, _)| id);
        }
        Ok(children)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
