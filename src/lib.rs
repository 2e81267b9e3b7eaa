//! cte-breakdown: recursive CTE walkthrough library.
//!
//! Loads a manager/employee relation into in-memory SQLite, unrolls the
//! recursive hierarchy query one level at a time, and renders each step
//! next to the equivalent `WITH RECURSIVE` result.

pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod observability;
pub mod report;
pub mod types;
