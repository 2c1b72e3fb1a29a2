use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "chatroom")]
#[command(about = "Chatroom - ephemeral group chat with heartbeat presence", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a room, reading commands from stdin and writing JSON lines to stdout
    Run {
        /// Seconds between presence sweeps
        #[arg(long)]
        tick_interval: Option<u64>,
        /// Seconds of silence before a participant may be evicted
        #[arg(long)]
        liveness_deadline: Option<u64>,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            tick_interval,
            liveness_deadline,
        } => {
            commands::run::execute(cli.config, tick_interval, liveness_deadline).await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(cli.config).await?,
        },
    }

    Ok(())
}
