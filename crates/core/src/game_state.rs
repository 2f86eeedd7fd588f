//! Game state module - the falling-block rules
//!
//! This module ties together the board, the piece catalogue, the RNG and the
//! scoring rules. It knows nothing about terminals or sessions: the host feeds
//! it [`GameAction`]s and calls [`GameState::tick`] once per scheduler tick.
//!
//! Every move, rotation and fall is tested against the board before it is
//! applied; a blocked attempt leaves the piece exactly where it was.

use crate::board::Board;
use crate::pieces::{get_mask, mask_cells, next_rotation, Mask};
use crate::rng::SimpleRng;
use crate::scoring::{gravity_delay, level_for_lines, lock_score};
use crate::types::{Cell, GameAction};

/// Active falling piece
///
/// `x`/`y` locate the top-left corner of the piece's 4x4 mask on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: usize,
    pub rotation: usize,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Mask column of the spawn position
    pub const SPAWN_X: i8 = 3;
    /// Mask row of the spawn position (every spawn mask has an empty top row)
    pub const SPAWN_Y: i8 = -1;

    /// Create a new tetromino at spawn position
    pub fn new(kind: usize) -> Self {
        Self {
            kind,
            rotation: 0,
            x: Self::SPAWN_X,
            y: Self::SPAWN_Y,
        }
    }

    pub fn mask(&self) -> &'static Mask {
        get_mask(self.kind, self.rotation)
    }

    /// Occupied board cells as `(x, y, value)`
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8, Cell)> {
        let (x, y) = (self.x, self.y);
        mask_cells(self.mask()).map(move |(dx, dy, v)| (x + dx, y + dy, v))
    }

    /// Check if all minos are in bounds and on empty cells
    pub fn fits(&self, board: &Board) -> bool {
        self.cells().all(|(x, y, _)| board.is_free(x, y))
    }

    /// Mask value covering board cell (x, y), if any
    pub fn cell_at(&self, x: i8, y: i8) -> Option<Cell> {
        let mx = x - self.x;
        let my = y - self.y;
        if !(0..4).contains(&mx) || !(0..4).contains(&my) {
            return None;
        }
        match self.mask()[my as usize][mx as usize] {
            0 => None,
            v => Some(v),
        }
    }
}

/// Complete falling-block state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<Tetromino>,
    rng: SimpleRng,
    lines: u32,
    level: u32,
    score: u32,
    /// Ticks left before the next gravity step
    gravity_wait: u32,
    /// Gravity steps taken by the active piece
    fall_ticks: u32,
    pieces_locked: u32,
    game_over: bool,
}

impl GameState {
    /// Create a new game with the given RNG seed.
    ///
    /// No piece is on the board yet; the first tick spawns one.
    pub fn new(seed: u32) -> Self {
        Self::with_rng(SimpleRng::new(seed))
    }

    pub fn with_rng(rng: SimpleRng) -> Self {
        Self {
            board: Board::new(),
            active: None,
            rng,
            lines: 0,
            level: level_for_lines(0),
            score: 0,
            gravity_wait: 0,
            fall_ticks: 0,
            pieces_locked: 0,
            game_over: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Cell to draw at (x, y): the active piece overlays the board
    pub fn visible_cell(&self, x: i8, y: i8) -> Cell {
        self.active
            .and_then(|piece| piece.cell_at(x, y))
            .or_else(|| self.board.get(x, y))
            .unwrap_or(0)
    }

    /// Apply a movement action to the active piece.
    ///
    /// Returns true if the piece changed. Non-movement actions are ignored.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if self.game_over {
            return false;
        }
        match action {
            GameAction::MoveLeft => self.try_shift(-1),
            GameAction::MoveRight => self.try_shift(1),
            GameAction::Rotate => self.try_rotate(),
            GameAction::Drop => self.hard_drop(),
            GameAction::ToggleColors | GameAction::Exit => false,
        }
    }

    /// Advance one scheduler tick.
    ///
    /// The level is recomputed from the line counter first, so it is correct
    /// even after a multi-line clear. Gravity fires when the countdown reaches
    /// zero: the piece falls one row, or locks and a new piece spawns.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }

        self.level = level_for_lines(self.lines);

        if self.gravity_wait == 0 {
            self.gravity_wait = gravity_delay(self.level);
            self.gravity_step();
        } else {
            self.gravity_wait -= 1;
        }
    }

    /// Place a specific piece type at the spawn position.
    ///
    /// Returns false (and ends the game) if the spawn position is blocked.
    pub fn spawn(&mut self, kind: usize) -> bool {
        let piece = Tetromino::new(kind);
        self.fall_ticks = 0;

        if !piece.fits(&self.board) {
            self.active = None;
            self.game_over = true;
            return false;
        }

        self.active = Some(piece);
        true
    }

    /// Replace the active piece, e.g. to set up a position in tests.
    ///
    /// Returns false and leaves the state untouched if `piece` does not fit.
    pub fn place(&mut self, piece: Tetromino) -> bool {
        if !piece.fits(&self.board) {
            return false;
        }
        self.active = Some(piece);
        true
    }

    fn gravity_step(&mut self) {
        let fell = match self.active {
            Some(_) => {
                self.fall_ticks += 1;
                self.step_down()
            }
            None => false,
        };

        if !fell {
            let kind = self.rng.next_piece();
            self.spawn(kind);
        }
    }

    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        self.try_replace(Tetromino {
            x: active.x + dx,
            ..active
        })
    }

    fn try_rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        self.try_replace(Tetromino {
            rotation: next_rotation(active.kind, active.rotation),
            ..active
        })
    }

    fn try_replace(&mut self, candidate: Tetromino) -> bool {
        if candidate.fits(&self.board) {
            self.active = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Move the piece one row down, or lock it where it is.
    ///
    /// Returns true if the piece moved.
    pub fn step_down(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let below = Tetromino {
            y: active.y + 1,
            ..active
        };
        if below.fits(&self.board) {
            self.active = Some(below);
            return true;
        }

        self.lock_active();
        false
    }

    /// Drop the active piece to the floor and lock it
    pub fn hard_drop(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        while self.step_down() {}
        true
    }

    /// Commit the active piece into the board and clear full rows.
    ///
    /// Returns the number of rows cleared.
    pub fn lock_active(&mut self) -> usize {
        let Some(active) = self.active.take() else {
            return 0;
        };

        for (x, y, value) in active.cells() {
            self.board.set(x, y, value);
        }

        self.score += lock_score(self.level, self.fall_ticks);
        self.pieces_locked += 1;

        let cleared = self.board.clear_full_rows().len();
        self.lines += cleared as u32;
        cleared
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
