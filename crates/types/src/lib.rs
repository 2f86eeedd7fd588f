//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the server.
//! All types are plain data with no external dependencies, so they can be
//! shared by the engine, the terminal channel and the scheduler alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//!
//! # Timing
//!
//! The scheduler advances every live game once per [`TICK_MS`]. Falling-block
//! gravity is expressed in ticks, not milliseconds:
//!
//! | Level | Ticks per row |
//! |-------|---------------|
//! | 1 | 10 |
//! | 5 | 6 |
//! | 10 | 1 |
//!
//! # Examples
//!
//! ```
//! use telnet_arcade_types::{Color, ClearMode, Shade, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(Color::Cyan.code(), 6);
//! assert_eq!(ClearMode::Entire.code(), 2);
//! assert!(Shade::bright(Color::Blue).bright);
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Scheduler period in milliseconds (20 iterations per second)
pub const TICK_MS: u64 = 50;

/// Highest reachable level
pub const MAX_LEVEL: u32 = 10;

/// Number of piece types in the catalogue
pub const PIECE_TYPES: usize = 7;

/// Longest name accepted on the score entry screen
pub const NAME_MAX_LEN: usize = 10;

/// Name stored when the player submits an empty name
pub const ANONYMOUS_NAME: &str = "ANONYM";

/// Rows of the scoreboard shown after a play-through
pub const SCOREBOARD_ROWS: usize = 10;

/// Lobby status refresh interval, in ticks
pub const LOBBY_REFRESH_TICKS: u32 = 100;

/// Scheduler iterations averaged into one frame-time sample
pub const STATS_WINDOW: u32 = 100;

/// Escape byte that introduces control sequences in both directions
pub const ESC: u8 = 0x1B;

/// Terminal bell
pub const BEL: u8 = 0x07;

/// Telnet "interpret as command"
pub const IAC: u8 = 0xFF;

/// Telnet WILL verb
pub const WILL: u8 = 0xFB;

/// Telnet ECHO option (server echoes, client stops local echo)
pub const OPT_ECHO: u8 = 0x01;

/// Telnet SUPPRESS-GO-AHEAD option (character-at-a-time mode)
pub const OPT_SUPPRESS_GO_AHEAD: u8 = 0x03;

/// Bytes emitted to every client before any other content
pub const NEGOTIATION_PREAMBLE: [u8; 6] = [
    IAC,
    WILL,
    OPT_ECHO,
    IAC,
    WILL,
    OPT_SUPPRESS_GO_AHEAD,
];

/// A board cell: 0 is empty, 1..=7 is a piece color index
pub type Cell = u8;


/// The eight named terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// SGR digit (the `d` in `ESC [ 3 d m`)
    pub fn code(self) -> u8 {
        match self {
            Color::Black => 0,
            Color::Red => 1,
            Color::Green => 2,
            Color::Yellow => 3,
            Color::Blue => 4,
            Color::Magenta => 5,
            Color::Cyan => 6,
            Color::White => 7,
        }
    }
}

/// A color plus its intensity.
///
/// Bright shades use the aixterm code set (`9d` / `10d`), which not every
/// terminal understands; picking a palette without them is the game's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shade {
    pub color: Color,
    pub bright: bool,
}

impl Shade {
    pub const fn normal(color: Color) -> Self {
        Self {
            color,
            bright: false,
        }
    }

    pub const fn bright(color: Color) -> Self {
        Self {
            color,
            bright: true,
        }
    }
}

/// Erase mode for screen and line clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// From the cursor to the end of the line/screen
    CursorToEnd,
    /// From the start of the line/screen to the cursor
    StartToCursor,
    /// The whole line/screen
    Entire,
}

impl ClearMode {
    /// Numeric parameter of `ESC [ n J` / `ESC [ n K`
    pub fn code(self) -> u8 {
        match self {
            ClearMode::CursorToEnd => 0,
            ClearMode::StartToCursor => 1,
            ClearMode::Entire => 2,
        }
    }
}

/// Axis along which `draw_line` advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Outcome of pushing a channel's buffered output to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStatus {
    /// Everything was sent; the buffer is empty
    Success,
    /// The transport would block; unsent bytes stay buffered for the next attempt
    Timeout,
    /// The transport failed; the connection is dead
    Error,
}

/// How a session participates in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Player,
    Spectator,
}

impl Role {
    pub fn toggled(self) -> Self {
        match self {
            Role::Player => Role::Spectator,
            Role::Spectator => Role::Player,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Spectator => "spectator",
        }
    }
}

/// Actions a keystroke can trigger inside the falling-block game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Shift the active piece one column left
    MoveLeft,
    /// Shift the active piece one column right
    MoveRight,
    /// Advance to the next rotation state
    Rotate,
    /// Drop to the floor and lock
    Drop,
    /// Flip the session's color capability
    ToggleColors,
    /// Leave the game
    Exit,
}

/// Actions a keystroke can trigger in the lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyAction {
    /// Pick the menu entry bound to this digit
    Select(u8),
    ToggleColors,
    /// Switch between playing and watching
    ToggleRole,
    Exit,
}
