//! Falling-block rules - pure, deterministic, and testable
//!
//! This crate holds the board, the piece catalogue, the scoring rules and the
//! game state that ties them together. It has no knowledge of terminals,
//! sockets or sessions; the server crate drives it one tick at a time.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of color indices with row compaction
//! - [`game_state`]: active piece, gravity countdown, score and line counters
//! - [`pieces`]: 4x4 rotation masks for the seven piece types
//! - [`rng`]: seeded LCG used to draw piece types
//! - [`scoring`]: level, gravity cadence and lock reward formulas
//!
//! # Example
//!
//! ```
//! use telnet_arcade_core::GameState;
//! use telnet_arcade_types::GameAction;
//!
//! let mut game = GameState::new(12345);
//! game.tick(); // first tick spawns a piece
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::Drop);
//!
//! assert!(game.score() > 0);
//! ```
//!
//! # Timing
//!
//! The host calls [`GameState::tick`](game_state::GameState::tick) once per
//! scheduler tick (50ms). Gravity fires every `11 - level` ticks.

pub mod board;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;

pub use telnet_arcade_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use game_state::{GameState, Tetromino};
pub use pieces::{get_mask, mask_cells, Mask};
pub use rng::SimpleRng;
pub use scoring::{gravity_delay, level_for_lines, lock_score};
