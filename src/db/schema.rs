//! SQLite schema initialization for the employee relation.
//!
//! A single three-column table plus an index on `manager_id`, which is the
//! column every recursion step filters on.

use rusqlite::Connection;

// ---------------------------------------------------------------------------
// DDL constants
// ---------------------------------------------------------------------------

const CREATE_EMPLOYEES: &str = "\
CREATE TABLE IF NOT EXISTS employees (
  employee_id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  manager_id INTEGER
)";

const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_employees_manager ON employees(manager_id)"];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Open (or create) the SQLite database at `db_path` and apply the schema.
///
/// Callers normally pass `":memory:"`; the relation lives only as long as
/// the connection.
///
/// # Errors
///
/// Returns a `rusqlite::Error` if the database cannot be opened or any DDL
/// statement fails.
pub fn initialize_database(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;

    // FK enforcement stays OFF: `manager_id` is a plain column so that a
    // dangling reference loads and is then excluded by the traversal.
    conn.pragma_update(None, "foreign_keys", "OFF")?;

    conn.execute_batch(CREATE_EMPLOYEES)?;
    for ddl in CREATE_INDEXES {
        conn.execute_batch(ddl)?;
    }

    Ok(conn)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
