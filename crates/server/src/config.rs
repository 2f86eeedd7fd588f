//! Server configuration.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::types::TICK_MS;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Scheduler period in milliseconds
    pub tick_ms: u64,
    /// Where the falling-block scoreboard is kept
    pub scoreboard_path: PathBuf,
    /// Cap on simultaneously open game instances; `None` is unlimited
    pub max_games: Option<usize>,
    /// Color capability given to new sessions
    pub colors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2333,
            tick_ms: TICK_MS,
            scoreboard_path: PathBuf::from("tetris-highscores.json"),
            max_games: None,
            colors: false,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("ARCADE_HOST").unwrap_or(defaults.host);
        let port = env::var("ARCADE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let tick_ms = env::var("ARCADE_TICK_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(defaults.tick_ms);
        let scoreboard_path = env::var("ARCADE_SCOREBOARD")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.scoreboard_path);
        let max_games = env::var("ARCADE_MAX_GAMES")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(defaults.max_games);
        let colors = env::var("ARCADE_COLORS")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.colors);

        Self {
            host,
            port,
            tick_ms,
            scoreboard_path,
            max_games,
            colors,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
