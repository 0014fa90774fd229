//! Stayclock CLI — entry point.
//!
//! # Commands
//!
//! - `stayclock gateway [--logs]` — LINE webhook + command router
//! - `stayclock console [-u USER]` — local REPL against the router
//! - `stayclock onboard` — write the default config
//! - `stayclock status` — show configuration status

mod console;
mod gateway;
mod helpers;
mod onboard;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ⏱ Stayclock — check-in/check-out bot for LINE
#[derive(Parser)]
#[command(name = "stayclock", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway (LINE webhook + command router)
    Gateway {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Send commands from the terminal as a given user
    Console {
        /// User ID to act as
        #[arg(short, long, default_value = "console-user")]
        user: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write the default configuration file
    Onboard,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Gateway { logs } => {
            init_logging(logs);
            gateway::run().await
        }
        Commands::Console { user, logs } => {
            init_logging(logs);
            console::run(&user)
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins over the flag.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "stayclock=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
