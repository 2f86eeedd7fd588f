//! Telnet arcade server (default binary).
//!
//! Settings come from `ARCADE_*` environment variables; command-line flags
//! override them. Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use telnet_arcade::server::{runtime, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "telnet-arcade")]
#[command(about = "Multiplayer terminal games over telnet")]
struct Cli {
    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// TCP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Scheduler period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Scoreboard file for the falling-block game
    #[arg(long)]
    scoreboard: Option<PathBuf>,

    /// Maximum number of simultaneously open games
    #[arg(long)]
    max_games: Option<usize>,

    /// Give new sessions the aixterm bright color palette
    #[arg(long)]
    colors: bool,
}

impl Cli {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(tick_ms) = self.tick_ms.filter(|&ms| ms > 0) {
            config.tick_ms = tick_ms;
        }
        if let Some(path) = self.scoreboard {
            config.scoreboard_path = path;
        }
        if self.max_games.is_some() {
            config.max_games = self.max_games;
        }
        config.colors |= self.colors;
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().apply(ServerConfig::from_env());
    info!(host = %config.host, port = config.port, tick_ms = config.tick_ms, "starting telnet arcade");
    runtime::run(config)
}
