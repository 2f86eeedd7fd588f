//! Single-player falling-block game with spectators and a persistent
//! scoreboard.
//!
//! An instance runs one play-through: it starts when a player-role session
//! arrives, switches to the name entry screen on game over, records the
//! result and then releases everyone back to the scheduler.

pub mod palette;
pub mod render;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{GameState, SimpleRng};
use crate::game::{Capacity, Game, GameError, GameKind, Outbox, Roster, TickContext};
use crate::input::{is_backspace, is_enter, is_name_char, map_key};
use crate::scoreboard::{record, ScoreEntry, Scoreboard};
use crate::session::{Session, SessionId};
use crate::types::{FlushStatus, GameAction, Role, ANONYMOUS_NAME, NAME_MAX_LEN};

use render::RunSummary;

/// Per-session state
#[derive(Debug, Default)]
struct Viewer {
    scoreboard_drawn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No play-through in progress
    Stopped,
    Running,
    /// Game over; the player is typing a name
    ScoreEntry,
}

pub struct FallingBlocks {
    roster: Roster<Viewer>,
    player: Option<SessionId>,
    state: GameState,
    phase: Phase,
    name: String,
    /// Table shown on the score entry screen
    table: Vec<ScoreEntry>,
    scoreboard: Arc<dyn Scoreboard>,
}

impl FallingBlocks {
    pub fn new(scoreboard: Arc<dyn Scoreboard>) -> Self {
        Self::with_state(scoreboard, GameState::with_rng(SimpleRng::from_clock()))
    }

    /// Deterministic piece sequence
    pub fn with_seed(scoreboard: Arc<dyn Scoreboard>, seed: u32) -> Self {
        Self::with_state(scoreboard, GameState::new(seed))
    }

    fn with_state(scoreboard: Arc<dyn Scoreboard>, state: GameState) -> Self {
        Self {
            roster: Roster::new(),
            player: None,
            state,
            phase: Phase::Stopped,
            name: String::new(),
            table: Vec::new(),
            scoreboard,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    fn run_frame(&mut self, outbox: &mut Outbox) {
        for id in self.roster.ids() {
            let is_player = self.player == Some(id);
            let Some(seat) = self.roster.get_mut(id) else {
                continue;
            };

            let mut exit = false;
            while let Some(key) = seat.session.vt().read_char() {
                match map_key(key) {
                    Some(GameAction::Exit) => {
                        exit = true;
                        break;
                    }
                    Some(GameAction::ToggleColors) => seat.session.toggle_color(),
                    Some(action) if is_player => {
                        self.state.apply_action(action);
                    }
                    _ => {}
                }
            }

            if exit {
                self.leave(id, outbox);
                if self.phase == Phase::Stopped {
                    return;
                }
            }
        }

        self.state.tick();
        if self.state.game_over() {
            self.start_score_entry();
            self.draw_scoreboards();
        } else {
            self.draw_frames();
        }
        self.flush_all(outbox);
    }

    fn draw_frames(&mut self) {
        for seat in self.roster.iter_mut() {
            let palette = palette::for_session(seat.session.color());
            let vt = seat.session.vt();
            if vt.is_congested() {
                continue;
            }
            render::draw_frame(vt, palette, &self.state);
        }
    }

    fn start_score_entry(&mut self) {
        info!(
            score = self.state.score(),
            lines = self.state.lines(),
            pieces = self.state.pieces_locked(),
            "game over"
        );
        self.phase = Phase::ScoreEntry;
        self.name.clear();
        self.table = self.scoreboard.load().unwrap_or_else(|err| {
            warn!(%err, "failed to load scoreboard");
            Vec::new()
        });
        for seat in self.roster.iter_mut() {
            seat.ext.scoreboard_drawn = false;
        }
    }

    fn draw_scoreboards(&mut self) {
        let run = RunSummary::of(&self.state);
        for seat in self.roster.iter_mut() {
            if seat.ext.scoreboard_drawn {
                continue;
            }
            let prompt = self.player == Some(seat.session.id());
            let palette = palette::for_session(seat.session.color());
            render::draw_scoreboard(seat.session.vt(), palette, &self.table, &run, prompt);
            if prompt && !self.name.is_empty() {
                seat.session.vt().write_text(&self.name);
            }
            seat.ext.scoreboard_drawn = true;
        }
    }

    fn score_entry(&mut self, outbox: &mut Outbox) {
        self.draw_scoreboards();

        for id in self.roster.ids() {
            let is_player = self.player == Some(id);
            let Some(seat) = self.roster.get_mut(id) else {
                continue;
            };

            if is_player {
                let mut commit = false;
                while let Some(key) = seat.session.vt().read_char() {
                    if is_enter(key) {
                        commit = true;
                        break;
                    } else if is_backspace(key) {
                        if self.name.pop().is_some() {
                            seat.session.vt().write_text("\x08 \x08");
                        }
                    } else if is_name_char(key) && self.name.len() < NAME_MAX_LEN {
                        let ch = char::from(key);
                        self.name.push(ch);
                        seat.session.vt().write_text(ch.encode_utf8(&mut [0; 4]));
                    }
                }
                if commit {
                    let name = if self.name.is_empty() {
                        ANONYMOUS_NAME.to_string()
                    } else {
                        std::mem::take(&mut self.name)
                    };
                    let entry = self.entry(name);
                    self.finish(outbox, Some(entry));
                    return;
                }
                // NUL keeps the connection probed while the player types
                if seat.session.vt().pending().is_empty() {
                    seat.session.vt().write_bytes(&[0]);
                }
            } else {
                let mut exit = false;
                while let Some(key) = seat.session.vt().read_char() {
                    match map_key(key) {
                        Some(GameAction::Exit) => {
                            exit = true;
                            break;
                        }
                        Some(GameAction::ToggleColors) => {
                            seat.session.toggle_color();
                            seat.ext.scoreboard_drawn = false;
                        }
                        _ => {}
                    }
                }
                if exit {
                    self.leave(id, outbox);
                }
            }
        }

        self.draw_scoreboards();
        self.flush_all(outbox);
    }

    fn flush_all(&mut self, outbox: &mut Outbox) {
        for id in self.roster.ids() {
            let failed = self
                .roster
                .get_mut(id)
                .map(|seat| seat.session.vt().flush() == FlushStatus::Error)
                .unwrap_or(false);
            if !failed {
                continue;
            }
            if let Some(seat) = self.roster.remove(id) {
                debug!(session = %id, "connection lost");
                outbox.player_left(seat.session, true);
            }
            if self.player == Some(id) {
                self.player = None;
                self.finish(outbox, None);
                return;
            }
        }
    }

    /// Detach one session cleanly; the player leaving ends the game unsaved.
    fn leave(&mut self, id: SessionId, outbox: &mut Outbox) {
        let Some(seat) = self.roster.remove(id) else {
            return;
        };
        debug!(session = %id, "left the game");
        outbox.release(seat.session);
        if self.player == Some(id) {
            self.player = None;
            self.finish(outbox, None);
        }
    }

    fn entry(&self, name: String) -> ScoreEntry {
        ScoreEntry {
            name,
            lines: self.state.lines(),
            score: self.state.score(),
        }
    }

    /// Store `result`, release every session and raise `Killed`.
    fn finish(&mut self, outbox: &mut Outbox, result: Option<ScoreEntry>) {
        if let Some(entry) = result {
            info!(name = %entry.name, score = entry.score, "recording score");
            if let Err(err) = record(self.scoreboard.as_ref(), entry) {
                warn!(%err, "failed to save scoreboard");
            }
        }
        for seat in self.roster.drain() {
            outbox.release(seat.session);
        }
        self.player = None;
        self.phase = Phase::Stopped;
        outbox.killed();
    }
}

impl Game for FallingBlocks {
    fn kind(&self) -> GameKind {
        GameKind::FALLING_BLOCKS
    }

    fn min_players(&self) -> usize {
        1
    }

    fn max_players(&self) -> Capacity {
        Capacity::Bounded(1)
    }

    fn player_count(&self) -> usize {
        self.roster.count_role(Role::Player)
    }

    fn session_count(&self) -> usize {
        self.roster.len()
    }

    fn add_player(&mut self, mut session: Session) {
        session.vt().bell();
        session.vt().set_cursor_visible(false);
        if session.is_player() && self.player.is_none() {
            info!(session = %session.id(), "play-through started");
            self.player = Some(session.id());
            if self.phase == Phase::Stopped {
                self.phase = Phase::Running;
            }
        }
        self.roster.insert(session, Viewer::default());
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), GameError> {
        match self.phase {
            Phase::Stopped => {}
            Phase::Running => self.run_frame(ctx.outbox),
            Phase::ScoreEntry => self.score_entry(ctx.outbox),
        }
        Ok(())
    }

    fn kill_game(&mut self, outbox: &mut Outbox) {
        let result = match self.phase {
            Phase::Running => Some(self.entry(ANONYMOUS_NAME.to_string())),
            Phase::Stopped | Phase::ScoreEntry => None,
        };
        self.finish(outbox, result);
    }
}

impl fmt::Debug for FallingBlocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallingBlocks")
            .field("phase", &self.phase)
            .field("player", &self.player)
            .field("sessions", &self.roster.len())
            .field("score", &self.state.score())
            .finish_non_exhaustive()
    }
}
