//! Gridlock - match server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use gridlock_engine::{Color, Engine, MatchId};
use gridlock_server::{router, MatchRegistry, ServerConfig};
use tokio::net::TcpListener;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    match cli.command {
        Command::Serve { port, host } => run_server(config.with_address(host, port)).await,
        Command::Check => run_check(&config),
    }
}

/// Run the HTTP match server
#[instrument(skip(config))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let registry = MatchRegistry::new(config.game().clone());
    let app = router(registry);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Gridlock server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Validate the configured game and print its starting position
#[instrument(skip(config))]
fn run_check(config: &ServerConfig) -> Result<()> {
    let engine = Engine::new(MatchId::new("check"), config.game().clone())?;

    println!("{}", engine.current_board());
    for color in [Color::Red, Color::Blue] {
        match engine.shortest_path(color) {
            Some(path) => println!("{color}: {} hops to goal", path.len() - 1),
            None => println!("{color}: no path to goal"),
        }
    }
    info!("Configuration OK");
    Ok(())
}
