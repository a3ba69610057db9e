use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Refresh timer settings shared by every hook of a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Interval used when a hook does not pass one (default: none, no polling).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_interval_ms: Option<u64>,
    /// Lower bound applied to every refresh interval (default: 100).
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    /// Skip ticks missed while the runtime was busy instead of delaying them
    /// (default: true).
    #[serde(default = "default_skip_missed_ticks")]
    pub skip_missed_ticks: bool,
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_skip_missed_ticks() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            default_interval_ms: None,
            min_interval_ms: default_min_interval_ms(),
            skip_missed_ticks: default_skip_missed_ticks(),
        }
    }
}

impl RefreshConfig {
    /// Effective interval for a hook: the requested one, else the configured
    /// default, clamped to the floor. `None` disables polling.
    pub fn resolve(&self, requested: Option<Duration>) -> Option<Duration> {
        let interval = requested.or(self.default_interval_ms.map(Duration::from_millis))?;
        let floor = Duration::from_millis(self.min_interval_ms);
        if interval < floor {
            tracing::debug!(
                requested_ms = interval.as_millis() as u64,
                floor_ms = self.min_interval_ms,
                "Refresh interval clamped to floor"
            );
        }
        Some(interval.max(floor))
    }

    pub fn missed_tick_behavior(&self) -> MissedTickBehavior {
        if self.skip_missed_ticks {
            MissedTickBehavior::Skip
        } else {
            MissedTickBehavior::Delay
        }
    }
}
