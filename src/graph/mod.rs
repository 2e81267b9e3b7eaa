//! Graph layer: SQLite-backed relation store, fixed-point traversal and
//! integrity checks.

pub mod integrity;
pub mod store;
pub mod traversal;
