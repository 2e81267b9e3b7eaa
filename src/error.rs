//! Error type shared by the store, traversal, integrity checks and config.

use thiserror::Error;

/// Everything that can go wrong while loading or walking the hierarchy.
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The store was queried before any rows were loaded.
    #[error("relation store queried before load")]
    NotLoaded,

    #[error("duplicate employee id {0}")]
    DuplicateId(i64),

    #[error("invalid employee {id}: {reason}")]
    Validation { id: i64, reason: String },

    #[error("employee {id} references missing manager {manager_id}")]
    DanglingReference { id: i64, manager_id: i64 },

    #[error("manager cycle detected: {}", format_cycle(.ids))]
    CycleDetected { ids: Vec<i64> },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_cycle(ids: &[i64]) -> String {
    let mut parts: Vec<String> = ids.iter().map(i64::to_string).collect();
    if let Some(first) = ids.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

pub type Result<T> = std::result::Result<T, HierarchyError>;
