//! Process wiring.
//!
//! Bridges the async accept loop with the synchronous scheduler: the listener
//! runs on a tokio runtime and hands sessions over an unbounded channel to the
//! scheduler, which owns its own thread. Closing the channel stops the
//! scheduler.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use crate::config::ServerConfig;
use crate::game::{Game, GameKind};
use crate::listener::run_listener;
use crate::lobby::{numbered_menu, Lobby};
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::scoreboard::{JsonFileScoreboard, Scoreboard};
use crate::session::Session;
use crate::tetris::FallingBlocks;

/// Register every shipped game, the lobby last so its menu lists the rest.
pub fn build_registry(scoreboard: Arc<dyn Scoreboard>) -> Registry {
    let mut registry = Registry::new();
    registry.register(GameKind::FALLING_BLOCKS, "Tetris", move || {
        Box::new(FallingBlocks::new(Arc::clone(&scoreboard))) as Box<dyn Game>
    });

    let menu = numbered_menu(&registry.menu());
    registry.register(GameKind::LOBBY, "Lobby", move || {
        Box::new(Lobby::new(menu.clone())) as Box<dyn Game>
    });
    registry
}

/// Start the scheduler loop on a dedicated thread.
pub fn spawn_scheduler(
    registry: Registry,
    config: &ServerConfig,
    arrivals: UnboundedReceiver<Session>,
) -> anyhow::Result<JoinHandle<()>> {
    let period = config.tick_period();
    let max_games = config.max_games;
    thread::Builder::new()
        .name("scheduler".to_string())
        .spawn(move || {
            Scheduler::new(registry)
                .with_period(period)
                .with_max_games(max_games)
                .run(arrivals);
        })
        .context("failed to spawn scheduler thread")
}

/// Serve until the listener fails or the process is interrupted.
pub fn run(config: ServerConfig) -> anyhow::Result<()> {
    let scoreboard = Arc::new(JsonFileScoreboard::new(&config.scoreboard_path));
    info!(path = %scoreboard.path().display(), "using scoreboard file");

    let (tx, rx) = mpsc::unbounded_channel::<Session>();
    let scheduler = spawn_scheduler(build_registry(scoreboard), &config, rx)?;

    let rt = Runtime::new().context("failed to create tokio runtime")?;
    let served = rt.block_on(async move {
        tokio::select! {
            result = run_listener(config, tx, None) => result,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                info!("interrupt received, shutting down");
                Ok(())
            }
        }
    });
    // The sender went down with the listener future; the scheduler now
    // disconnects everyone and returns.
    drop(rt);

    scheduler
        .join()
        .map_err(|_| anyhow!("scheduler thread panicked"))?;
    served
}
