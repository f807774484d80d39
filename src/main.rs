//! Chat song-request bot.
//!
//! # Architecture Overview
//!
//! ```text
//!     Stream chat (IRC over WebSocket)
//!          │
//!          ▼
//!     ┌──────────┐    ┌────────────┐    ┌──────────────┐
//!     │   chat   │───▶│  commands  │───▶│   routing    │
//!     │  client  │    │ dispatcher │    │ router/chain │
//!     └────▲─────┘    └────────────┘    └──────┬───────┘
//!          │                                   │
//!          │                                   ▼
//!     ┌──────────┐                      ┌──────────────┐    ┌───────────┐
//!     │ outbound │◀─────── replies ─────│   playback   │───▶│ broadcast │
//!     │  queue   │                      │ manager/store│    │    hub    │
//!     └──────────┘                      └──────────────┘    └─────┬─────┘
//!                                                                 │
//!                                                                 ▼
//!                                                          ┌────────────┐
//!                                                          │    http    │───▶ Viewer pages
//!                                                          │ /ws /health│
//!                                                          └────────────┘
//!
//!     Cross-cutting: config, observability, resilience, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;

use playlist_bot::config::{load_config, load_from_env};
use playlist_bot::lifecycle::{self, signals::wait_for_signal};
use playlist_bot::observability::{logging::init_logging, metrics::init_metrics};
use playlist_bot::Shutdown;

#[derive(Parser, Debug)]
#[command(name = "playlist-bot", version, about = "Chat song-request bot")]
struct Cli {
    /// Path to a TOML config file; without it defaults and environment are used.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "playlist-bot starting");

    tracing::info!(
        environment = ?config.environment,
        channels = config.chat.channels.len(),
        command = %config.chat.root_command(),
        bind_address = %config.server.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    lifecycle::run(config, cli.config.as_deref(), shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
