//! Command-line interface for the gridlock server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gridlock - wall-and-dice race game server
#[derive(Parser, Debug)]
#[command(name = "gridlock")]
#[command(about = "HTTP match server for the gridlock rules engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file. Defaults apply if it does not exist.
    #[arg(short, long, default_value = "gridlock.toml", global = true)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP match server
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Validate the configured game and print its starting board
    Check,
}
