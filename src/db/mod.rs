//! Database layer: SQLite schema for the employee relation.

pub mod schema;
