//! Retention sweeper configuration.

use serde::{Deserialize, Serialize};

/// How often old rows are purged and how old they must be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Whether the sweeper runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hours between sweeps.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    /// Rows created at or before `now - horizon_days` are deleted.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: default_interval_hours(),
            horizon_days: default_horizon_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_hours() -> u64 {
    24
}

fn default_horizon_days() -> i64 {
    30
}
