//! Participant model.

use crate::error::{ChatError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A live member of the room.
///
/// Names are unique across live participants and compared exactly
/// (case-sensitive). `last_seen` is set at join and refreshed by every
/// heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Display name, also the registry key
    pub name: String,
    /// Last liveness signal
    pub last_seen: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_seen,
        }
    }

    /// Returns true if more than `deadline` has elapsed since the last heartbeat.
    ///
    /// Exactly `deadline` of silence is still considered alive.
    pub fn is_stale(&self, now: DateTime<Utc>, deadline: TimeDelta) -> bool {
        now - self.last_seen > deadline
    }
}

/// Rejects empty or whitespace-only participant names.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ChatError::validation("participant name must not be empty"));
    }
    Ok(())
}
