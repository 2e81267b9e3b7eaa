//! Configuration loading.
//!
//! A YAML file is optional; CLI flags are applied on top by the caller via
//! [`Overrides`].

pub mod schema;

use std::path::Path;

use crate::error::{HierarchyError, Result};

pub use schema::{BreakdownConfig, IntegrityPolicy};

/// Command-line settings that take priority over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub strict: bool,
    pub no_sql: bool,
}

/// Read a config file, or return the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<BreakdownConfig> {
    let Some(path) = path else {
        return Ok(BreakdownConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| {
        HierarchyError::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    let config: BreakdownConfig = if text.trim().is_empty() {
        BreakdownConfig::default()
    } else {
        serde_yaml::from_str(&text)?
    };
    if config.version != "1.0" {
        return Err(HierarchyError::Config(format!(
            "unsupported config version {:?}",
            config.version
        )));
    }
    tracing::debug!(path = %path.display(), policy = %config.policy, "loaded config");
    Ok(config)
}

/// Merge CLI overrides into a loaded config.
pub fn apply_overrides(mut config: BreakdownConfig, overrides: Overrides) -> BreakdownConfig {
    if overrides.strict {
        config.policy = IntegrityPolicy::Strict;
    }
    if overrides.no_sql {
        config.show_sql = false;
    }
    config
}
