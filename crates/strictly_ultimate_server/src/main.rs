//! Strictly Ultimate - server CLI

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use strictly_ultimate_server::cli::{Cli, Command, ConfigArgs};
use strictly_ultimate_server::GameServer;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,strictly_ultimate=debug,strictly_ultimate_server=debug".into()
            }),
        )
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::Rules(args) => print_rules(args),
    }
}

/// Serve one session until it is shut down or the process is interrupted.
#[instrument(skip_all)]
async fn run_server(args: ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    info!(
        addr = %config.bind_addr(),
        seats = %config.seats(),
        rules = %config.rules(),
        "Starting Strictly Ultimate server"
    );

    let server = GameServer::new(config);
    tokio::select! {
        result = server.run() => result?,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for interrupt");
            }
            info!("Interrupted, exiting");
        }
    }
    Ok(())
}

fn print_rules(args: ConfigArgs) -> Result<()> {
    let config = args.resolve()?;
    println!("bind:      {}", config.bind_addr());
    println!("seats:     {} ({:?})", config.seats(), config.seats().seating_order());
    println!("win:       {}", config.win_policy());
    println!("tie:       {}", config.rules().tie);
    Ok(())
}
