//! Configuration data structures for cte-breakdown.
//!
//! Defines the YAML config format: integrity policy, report options, and an
//! optional replacement for the built-in employee table.

use serde::{Deserialize, Serialize};

use crate::types::{sample_employees, Employee};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration. Every field has a default, so an empty file (or no
/// file at all) reproduces the built-in walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// How bad rows are treated.
    #[serde(default)]
    pub policy: IntegrityPolicy,

    /// Print the SQL each step would run.
    #[serde(default = "default_show_sql")]
    pub show_sql: bool,

    /// Replacement employee table. `None` uses the built-in sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<Employee>>,
}

impl Default for BreakdownConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            policy: IntegrityPolicy::default(),
            show_sql: default_show_sql(),
            employees: None,
        }
    }
}

impl BreakdownConfig {
    /// The rows to load: the configured table, or the built-in sample.
    pub fn employees(&self) -> Vec<Employee> {
        self.employees.clone().unwrap_or_else(sample_employees)
    }
}

// ---------------------------------------------------------------------------
// IntegrityPolicy
// ---------------------------------------------------------------------------

/// What to do with rows the traversal cannot place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Leave unreachable rows out of the hierarchy.
    #[default]
    Lenient,
    /// Reject invalid rows, dangling managers and cycles before traversal.
    Strict,
}

impl IntegrityPolicy {
    /// Canonical string representation, matching the YAML spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for IntegrityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_show_sql() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
