//! Color palettes for the falling-block screen.

use crate::types::{Color, Shade, PIECE_TYPES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Shade,
    pub band: Shade,
    pub text: Shade,
    /// Indexed by cell value - 1
    pub pieces: [Shade; PIECE_TYPES],
}

impl Palette {
    pub fn piece(&self, cell: u8) -> Shade {
        self.pieces[(cell as usize).saturating_sub(1) % PIECE_TYPES]
    }
}

/// For terminals with the aixterm bright colors
pub const STANDARD: Palette = Palette {
    background: Shade::bright(Color::Blue),
    band: Shade::normal(Color::Yellow),
    text: Shade::bright(Color::Yellow),
    pieces: [
        Shade::normal(Color::Cyan),
        Shade::bright(Color::Cyan),
        Shade::bright(Color::Green),
        Shade::bright(Color::Red),
        Shade::normal(Color::White),
        Shade::bright(Color::Magenta),
        Shade::bright(Color::Yellow),
    ],
};

/// Plain VT100 colors only
pub const COMPATIBILITY: Palette = Palette {
    background: Shade::normal(Color::Black),
    band: Shade::normal(Color::Yellow),
    text: Shade::normal(Color::White),
    pieces: [Shade::normal(Color::Cyan); PIECE_TYPES],
};

pub fn for_session(color: bool) -> &'static Palette {
    if color {
        &STANDARD
    } else {
        &COMPATIBILITY
    }
}
