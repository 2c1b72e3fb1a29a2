//! Configuration service implementation.
//!
//! Loads the room configuration from a TOML file
//! (`~/.config/chatroom/config.toml` unless a path is given) and applies
//! environment overrides on top.

use crate::paths::ChatroomPaths;
use chatroom_core::config::RoomConfig;
use chatroom_core::error::{ChatError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const ENV_TICK_INTERVAL_SECS: &str = "CHATROOM_TICK_INTERVAL_SECS";
pub const ENV_LIVENESS_DEADLINE_SECS: &str = "CHATROOM_LIVENESS_DEADLINE_SECS";
pub const ENV_LOG_LEVEL: &str = "CHATROOM_LOG_LEVEL";

/// Configuration service that loads and caches the room configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RoomConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading from the platform configuration directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(ChatroomPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file and process environment if
    /// not cached.
    pub async fn get_config(&self) -> Result<RoomConfig> {
        if let Some(cached) = self.config.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.load(|key| std::env::var(key).ok()).await?;
        *self.config.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    /// Reads the file (defaults if it does not exist), applies overrides
    /// resolved through `lookup`, and validates the result.
    pub async fn load<F>(&self, lookup: F) -> Result<RoomConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => toml::from_str::<RoomConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.path.display()
                );
                RoomConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }
}

/// Applies `CHATROOM_*` overrides to `config`.
pub fn apply_overrides<F>(config: &mut RoomConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_TICK_INTERVAL_SECS) {
        config.presence.tick_interval_secs = parse_secs(ENV_TICK_INTERVAL_SECS, &value)?;
    }
    if let Some(value) = lookup(ENV_LIVENESS_DEADLINE_SECS) {
        config.presence.liveness_deadline_secs = parse_secs(ENV_LIVENESS_DEADLINE_SECS, &value)?;
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.log_level = value;
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        ChatError::config(format!(
            "{} must be a whole number of seconds, got '{}'",
            key, value
        ))
    })
}
