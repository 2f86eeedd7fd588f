//! Keystroke mapping (game-facing).
//!
//! Telnet clients in character mode deliver one byte per key press; the
//! terminal channel has already stripped escape sequences by the time a byte
//! gets here. This crate turns those bytes into [`crate::types::GameAction`]s
//! and [`crate::types::LobbyAction`]s and classifies the editing keys used on
//! the score entry screen.

pub mod map;

pub use telnet_arcade_types as types;

pub use map::{is_backspace, is_enter, is_name_char, map_key, map_lobby_key};
