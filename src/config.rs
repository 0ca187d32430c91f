use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;

use crate::error::Result;

/// Tuning for a single solve. Every field is optional in the YAML file.
///
/// ```yaml
/// time_limit_seconds: 30
/// threads: 4
/// log_solver: false
/// break_symmetry: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Wall-clock budget handed to the MILP engine.
    pub time_limit_seconds: Option<f64>,
    pub threads: Option<u32>,
    /// Let the engine print its own progress log.
    pub log_solver: bool,
    /// Pin guest 0 to table 0 to cut symmetric branches.
    pub break_symmetry: bool,
}

impl PlannerConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml(&read_to_string(path)?)
    }
}
