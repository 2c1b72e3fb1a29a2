//! Room configuration model.

use crate::error::{ChatError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_LIVENESS_DEADLINE_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Longest accepted sweep interval (one day).
pub const MAX_TICK_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Root configuration structure for config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    #[serde(default)]
    pub presence: PresenceSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            presence: PresenceSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl RoomConfig {
    pub fn validate(&self) -> Result<()> {
        self.presence.validate()
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Timing of the presence reaper.
///
/// With the defaults (tick 15s, deadline 10s) a participant that stops sending
/// heartbeats is evicted between 10 and 25 seconds after its last one.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSettings {
    /// Seconds between two sweeps
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Seconds of silence after which a participant may be evicted
    #[serde(default = "default_liveness_deadline_secs")]
    pub liveness_deadline_secs: u64,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            liveness_deadline_secs: DEFAULT_LIVENESS_DEADLINE_SECS,
        }
    }
}

fn default_tick_interval_secs() -> u64 {
    DEFAULT_TICK_INTERVAL_SECS
}

fn default_liveness_deadline_secs() -> u64 {
    DEFAULT_LIVENESS_DEADLINE_SECS
}

impl PresenceSettings {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_secs == 0 {
            return Err(ChatError::config("tick_interval_secs must be greater than 0"));
        }
        if self.tick_interval_secs > MAX_TICK_INTERVAL_SECS {
            return Err(ChatError::config(format!(
                "tick_interval_secs must be at most {}",
                MAX_TICK_INTERVAL_SECS
            )));
        }
        if self.liveness_deadline_secs == 0 {
            return Err(ChatError::config("liveness_deadline_secs must be greater than 0"));
        }
        if deadline_delta(self.liveness_deadline_secs).is_none() {
            return Err(ChatError::config("liveness_deadline_secs is too large"));
        }
        Ok(())
    }

    /// Settings that are accepted but worth telling the operator about.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.tick_interval_secs < self.liveness_deadline_secs {
            warnings.push(format!(
                "tick interval ({}s) is shorter than the liveness deadline ({}s)",
                self.tick_interval_secs, self.liveness_deadline_secs
            ));
        }
        warnings
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn liveness_deadline(&self) -> TimeDelta {
        deadline_delta(self.liveness_deadline_secs).unwrap_or(TimeDelta::MAX)
    }

    /// Upper bound on how long a silent participant stays in the registry.
    pub fn worst_case_eviction(&self) -> Duration {
        Duration::from_secs(
            self.tick_interval_secs
                .saturating_add(self.liveness_deadline_secs),
        )
    }
}

fn deadline_delta(secs: u64) -> Option<TimeDelta> {
    i64::try_from(secs).ok().and_then(TimeDelta::try_seconds)
}
