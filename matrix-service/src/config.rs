// Fan-out Configuration
// Limits applied by callers before matrix expansion

use crate::error::MatrixResult;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default ceiling on combinations generated for a single task
pub const DEFAULT_MAX_COMBINATIONS: usize = 256;

/// Configuration for matrix fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FanOutConfig {
    /// Maximum number of combinations a single matrixed task may produce
    pub max_combinations: usize,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl FanOutConfig {
    pub fn with_max_combinations(max_combinations: usize) -> Self {
        Self { max_combinations }
    }

    /// Load config from a YAML string. Missing keys take their defaults.
    pub fn from_yaml(content: &str) -> MatrixResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load config from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> MatrixResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Whether a combination count is within the configured limit
    pub fn allows(&self, count: usize) -> bool {
        count <= self.max_combinations
    }
}
