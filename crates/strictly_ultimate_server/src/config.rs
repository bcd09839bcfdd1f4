//! Server configuration.

use crate::session::GameSettings;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_ultimate::{Rules, SeatCount, TiePolicy, WinPolicy};
use tracing::{debug, info, instrument};

/// Configuration for the game server.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Seats required before play starts (2 or 3).
    #[serde(default)]
    seats: SeatCount,

    /// Macro board win rule.
    #[serde(default)]
    win_policy: WinPolicy,

    /// Wipe and reopen small boards that end tied.
    #[serde(default)]
    reset_on_tie: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8765
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            seats: SeatCount::default(),
            win_policy: WinPolicy::default(),
            reset_on_tie: false,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(
            host = %config.host,
            port = config.port,
            seats = %config.seats,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Overrides the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the seat count.
    pub fn with_seats(mut self, seats: SeatCount) -> Self {
        self.seats = seats;
        self
    }

    /// Overrides the macro win rule.
    pub fn with_win_policy(mut self, win_policy: WinPolicy) -> Self {
        self.win_policy = win_policy;
        self
    }

    /// Overrides the tie rule.
    pub fn with_reset_on_tie(mut self, reset_on_tie: bool) -> Self {
        self.reset_on_tie = reset_on_tie;
        self
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Board rules derived from this config.
    pub fn rules(&self) -> Rules {
        let tie = if self.reset_on_tie {
            TiePolicy::Reset
        } else {
            TiePolicy::Freeze
        };
        Rules::new(self.win_policy, tie)
    }

    /// Session settings derived from this config.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings::new(self.seats, self.rules())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
