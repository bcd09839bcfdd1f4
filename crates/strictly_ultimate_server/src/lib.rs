//! Strictly Ultimate server library - authoritative multiplayer sessions
//!
//! Hosts one ultimate tic-tac-toe game for two or three seated players plus
//! any number of observers, speaking newline-delimited JSON over TCP.
//!
//! # Architecture
//!
//! - **Session**: seat roster, turn rotation and broadcast behind one lock
//! - **Connection**: per-socket reader loop plus a writer task
//! - **Server**: accept loop that stops when the session shuts down
//! - **Protocol**: client and server message types
//!
//! # Example
//!
//! ```no_run
//! use strictly_ultimate_server::{GameServer, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = GameServer::new(ServerConfig::default().with_port(9000));
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod config;
mod connection;
mod protocol;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Wire protocol
pub use protocol::{ClientMessage, GameView, SeatView, ServerMessage, SessionPhase};

// Crate-level exports - Session management
pub use session::{GameSettings, Outbound, ParticipantId, Role, Session, SessionError};

// Crate-level exports - Networking
pub use connection::{MAX_LINE_BYTES, serve_connection};
pub use server::GameServer;
