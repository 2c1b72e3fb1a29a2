use anyhow::{Context, Result};
use chatroom_core::config::RoomConfig;
use chatroom_infrastructure::ConfigService;
use std::path::PathBuf;

/// Resolves the config service for an optional explicit path.
pub fn service(path: Option<PathBuf>) -> Result<ConfigService> {
    match path {
        Some(path) => Ok(ConfigService::with_path(path)),
        None => ConfigService::new().context("Failed to locate configuration directory"),
    }
}

pub async fn load(path: Option<PathBuf>) -> Result<RoomConfig> {
    load_from(&service(path)?).await
}

pub async fn load_from(service: &ConfigService) -> Result<RoomConfig> {
    service
        .get_config()
        .await
        .with_context(|| format!("Failed to load {}", service.path().display()))
}

pub async fn show(path: Option<PathBuf>) -> Result<()> {
    let config = load(path).await?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
