//! Command-line interface for strictly_ultimate.

use crate::config::{ConfigError, ServerConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use strictly_ultimate::{SeatCount, WinPolicy};
use tracing::instrument;

/// Strictly Ultimate - authoritative ultimate tic-tac-toe server
#[derive(Parser, Debug)]
#[command(name = "strictly_ultimate")]
#[command(about = "Multiplayer ultimate tic-tac-toe server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a game session
    Serve(ConfigArgs),

    /// Print the resolved configuration and rules without serving
    Rules(ConfigArgs),
}

/// Configuration sources shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seats required before play starts (2 or 3)
    #[arg(short, long)]
    pub seats: Option<SeatCount>,

    /// Macro win rule (adjacent-pair or three-in-line)
    #[arg(long)]
    pub win_policy: Option<WinPolicy>,

    /// Wipe and reopen small boards that end tied
    #[arg(long)]
    pub reset_on_tie: bool,
}

impl ConfigArgs {
    /// Loads the config file (if any) and applies command-line overrides.
    #[instrument(skip(self))]
    pub fn resolve(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = &self.host {
            config = config.with_host(host.clone());
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(seats) = self.seats {
            config = config.with_seats(seats);
        }
        if let Some(win_policy) = self.win_policy {
            config = config.with_win_policy(win_policy);
        }
        if self.reset_on_tie {
            config = config.with_reset_on_tie(true);
        }
        Ok(config)
    }
}
