use super::shell::{self, ShellCommand};
use anyhow::{Context, Result};
use chatroom_application::{PresenceReaper, RoomUseCase};
use chatroom_core::clock::{Clock, SystemClock};
use chatroom_core::config::RoomConfig;
use chatroom_core::message::MessageRepository;
use chatroom_core::participant::ParticipantRepository;
use chatroom_infrastructure::{InMemoryMessageRepository, InMemoryParticipantRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

pub async fn execute(
    config_path: Option<PathBuf>,
    tick_interval: Option<u64>,
    liveness_deadline: Option<u64>,
) -> Result<()> {
    let service = super::config::service(config_path)?;
    let mut config = super::config::load_from(&service).await?;
    apply_cli_overrides(&mut config, tick_interval, liveness_deadline);
    config.validate().context("Invalid presence settings")?;

    init_tracing(&config.log_level);
    tracing::debug!("Configuration from {}", service.path().display());
    for warning in config.presence.warnings() {
        tracing::warn!("{}", warning);
    }

    let participants: Arc<dyn ParticipantRepository> =
        Arc::new(InMemoryParticipantRepository::new());
    let messages: Arc<dyn MessageRepository> = Arc::new(InMemoryMessageRepository::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let room = RoomUseCase::new(participants.clone(), messages.clone(), clock.clone());
    let shutdown = CancellationToken::new();
    let reaper = PresenceReaper::new(participants, messages, clock, config.presence)
        .spawn_with_cancellation(shutdown.child_token());

    tracing::info!(
        "Room open (evicting after {}s of silence, sweeping every {}s)",
        config.presence.liveness_deadline_secs,
        config.presence.tick_interval_secs
    );

    let result = serve(&room).await;

    shutdown.cancel();
    reaper.stop().await;
    tracing::info!("Room closed");
    result
}

fn apply_cli_overrides(
    config: &mut RoomConfig,
    tick_interval: Option<u64>,
    liveness_deadline: Option<u64>,
) {
    if let Some(secs) = tick_interval {
        config.presence.tick_interval_secs = secs;
    }
    if let Some(secs) = liveness_deadline {
        config.presence.liveness_deadline_secs = secs;
    }
}

async fn serve(room: &RoomUseCase) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };
        // EOF
        let Some(line) = line else { break };

        let response = match shell::parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(ShellCommand::Quit)) => break,
            Ok(Some(command)) => shell::execute(room, command).await,
            Err(message) => shell::parse_error_response(&message),
        };

        let mut rendered = serde_json::to_string(&response)?;
        rendered.push('\n');
        stdout
            .write_all(rendered.as_bytes())
            .await
            .context("Failed to write response")?;
        stdout.flush().await?;
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON responses
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        tracing::debug!("Keeping the existing subscriber: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_feed_validation_and_warnings() {
        let mut config = RoomConfig::default();

        apply_cli_overrides(&mut config, Some(5), None);

        assert_eq!(config.presence.tick_interval_secs, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.presence.warnings().len(), 1);

        apply_cli_overrides(&mut config, Some(u64::MAX), Some(3));
        assert_eq!(config.presence.liveness_deadline_secs, 3);
        assert!(config.validate().is_err());
    }
}
