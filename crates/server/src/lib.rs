//! Telnet game server.
//!
//! Clients connect over plain telnet, land in the [`lobby`] and pick a game.
//! A single [`scheduler`] thread ticks every live game instance at a fixed
//! rate; each instance owns the [`session`]s playing or watching it and talks
//! back to the scheduler only through the [`game::Outbox`].
//!
//! ```no_run
//! use telnet_arcade_server::{config::ServerConfig, runtime};
//!
//! fn main() -> anyhow::Result<()> {
//!     runtime::run(ServerConfig::from_env())
//! }
//! ```

pub mod config;
pub mod game;
pub mod listener;
pub mod lobby;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod scoreboard;
pub mod session;
pub mod tetris;

pub use telnet_arcade_core as core;
pub use telnet_arcade_input as input;
pub use telnet_arcade_term as term;
pub use telnet_arcade_types as types;

pub use config::ServerConfig;
pub use game::{Capacity, Game, GameError, GameEvent, GameKind, Outbox, Roster, Seat, TickContext};
pub use lobby::Lobby;
pub use registry::Registry;
pub use scheduler::{AdmissionError, GameId, InstanceInfo, Scheduler, SchedulerStats};
pub use scoreboard::{JsonFileScoreboard, MemoryScoreboard, ScoreEntry, Scoreboard, ScoreboardError};
pub use session::{Session, SessionId};
pub use tetris::FallingBlocks;
