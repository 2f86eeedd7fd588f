//! Inbound keystroke decoding.
//!
//! Arrow keys and terminal responses arrive as escape sequences. The decoder
//! swallows everything from an ESC byte up to and including the first ASCII
//! letter; every other byte is a keystroke. The state survives between reads,
//! so a sequence split across two packets is still filtered.

use crate::types::ESC;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyDecoder {
    in_escape: bool,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one inbound byte; returns it if it is a plain keystroke.
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        if self.in_escape {
            if byte.is_ascii_alphabetic() {
                self.in_escape = false;
            }
            return None;
        }
        if byte == ESC {
            self.in_escape = true;
            return None;
        }
        Some(byte)
    }

    /// True while the decoder is inside an unterminated escape sequence
    pub fn in_escape(&self) -> bool {
        self.in_escape
    }
}
