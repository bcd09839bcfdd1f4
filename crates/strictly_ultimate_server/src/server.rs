//! TCP accept loop.

use crate::config::ServerConfig;
use crate::connection::serve_connection;
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

/// How long to wait for connections to flush the shutdown notice.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

/// Game server hosting a single session.
#[derive(Debug)]
pub struct GameServer {
    config: ServerConfig,
    session: Arc<Session>,
}

impl GameServer {
    /// Creates a server and its session from configuration.
    #[instrument(skip(config))]
    pub fn new(config: ServerConfig) -> Self {
        let session = Arc::new(Session::new(config.game_settings()));
        Self { config, session }
    }

    /// The hosted session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Binds the configured address and serves until the session shuts down.
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        info!(addr = %listener.local_addr()?, "Server listening");
        self.run_with_listener(listener).await
    }

    /// Runs the accept loop on a pre-bound listener.
    #[instrument(skip_all)]
    pub async fn run_with_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let mut shutdown = self.session.subscribe_shutdown();
        if *shutdown.borrow_and_update() {
            info!("Session already terminated");
            return Ok(());
        }
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, peer) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!(%peer, error = %e, "Failed to set TCP_NODELAY");
                    }
                    info!(%peer, "Accepted connection");
                    connections.spawn(serve_connection(Arc::clone(&self.session), stream, peer));
                }
                // Reap finished workers so the set stays small.
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.changed() => {
                    info!("Session terminated, stopping accept loop");
                    break;
                }
            }
        }

        drop(listener);
        let drain = async { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_DRAIN, drain).await.is_err() {
            warn!("Connections still open after shutdown, aborting them");
            connections.abort_all();
        }

        info!("Server stopped");
        Ok(())
    }
}
