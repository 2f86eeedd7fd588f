//! The game contract: what every game exposes to the scheduler.
//!
//! A game never calls back into the scheduler. Everything it wants to tell
//! the outside world (it ended, a session left, a session should go to another
//! game) is pushed into the [`Outbox`] it is handed, together with the
//! [`Session`] value itself when one changes hands.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::scheduler::SchedulerStats;
use crate::session::{Session, SessionId};
use crate::types::{FlushStatus, Role};

/// Identifier a game is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameKind(&'static str);

impl GameKind {
    pub const LOBBY: GameKind = GameKind("lobby");
    pub const FALLING_BLOCKS: GameKind = GameKind("tetris");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Upper bound on the number of players in one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Bounded(usize),
    Unbounded,
}

impl Capacity {
    /// Whether an instance currently holding `players` can take one more
    pub fn has_room(self, players: usize) -> bool {
        match self {
            Capacity::Bounded(max) => players < max,
            Capacity::Unbounded => true,
        }
    }
}

/// Notification raised by a game during a tick or a forced kill
#[derive(Debug)]
pub enum GameEvent {
    /// The game has torn itself down; it owns no sessions any more
    Killed,
    /// A session detached from the game
    PlayerLeft {
        session: Session,
        connection_lost: bool,
    },
    /// A session should be admitted into a game of `target`
    HandedOff { target: GameKind, session: Session },
}

/// Collects the notifications a game raises
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<GameEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn killed(&mut self) {
        self.events.push(GameEvent::Killed);
    }

    pub fn player_left(&mut self, session: Session, connection_lost: bool) {
        self.events.push(GameEvent::PlayerLeft {
            session,
            connection_lost,
        });
    }

    pub fn hand_off(&mut self, target: GameKind, session: Session) {
        self.events.push(GameEvent::HandedOff { target, session });
    }

    /// Detach a session after pushing out whatever it still has buffered.
    ///
    /// The session counts as lost if that last flush fails.
    pub fn release(&mut self, mut session: Session) {
        let lost = session.vt().flush() == FlushStatus::Error;
        self.player_left(session, lost);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }
}

/// What a game sees of the world during one tick
pub struct TickContext<'a> {
    /// Scheduler diagnostics as of the end of the previous iteration
    pub stats: &'a SchedulerStats,
    pub outbox: &'a mut Outbox,
}

/// A game-logic fault; the scheduler destroys the instance that raised it
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    Logic(String),
    #[error("tick panicked: {0}")]
    Panicked(String),
}

impl GameError {
    pub fn logic(message: impl Into<String>) -> Self {
        GameError::Logic(message.into())
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "non-string panic payload".to_string()),
        };
        GameError::Panicked(message)
    }
}

/// A game instance hosted by the scheduler.
///
/// Every method runs on the scheduler thread and never concurrently with
/// another method of the same instance.
pub trait Game: Send {
    fn kind(&self) -> GameKind;

    /// Player-role sessions needed before the scheduler ticks the instance
    fn min_players(&self) -> usize {
        0
    }

    fn max_players(&self) -> Capacity;

    /// Player-role sessions currently owned
    fn player_count(&self) -> usize;

    /// All sessions currently owned, spectators included
    fn session_count(&self) -> usize;

    /// Instances the scheduler keeps alive even while empty
    fn persistent(&self) -> bool {
        false
    }

    /// Take ownership of a session. The scheduler has already checked capacity.
    fn add_player(&mut self, session: Session);

    /// Drain input, advance, render and flush once for every owned session.
    ///
    /// Sessions that leave during the tick are handed back through
    /// `ctx.outbox`. Returning an error destroys the instance.
    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), GameError>;

    /// Release every session and raise [`GameEvent::Killed`].
    fn kill_game(&mut self, outbox: &mut Outbox);
}

/// A session plus the game-specific state kept for it
#[derive(Debug)]
pub struct Seat<X> {
    pub session: Session,
    pub ext: X,
}

/// Sessions owned by one game instance, in admission order.
///
/// Iteration order is stable; games that may detach sessions mid-pass walk a
/// snapshot of [`ids`](Roster::ids) and look each seat up again.
#[derive(Debug)]
pub struct Roster<X> {
    seats: Vec<Seat<X>>,
    index: HashMap<SessionId, usize>,
}

impl<X> Roster<X> {
    pub fn new() -> Self {
        Self {
            seats: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn insert(&mut self, session: Session, ext: X) {
        self.index.insert(session.id(), self.seats.len());
        self.seats.push(Seat { session, ext });
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Seat<X>> {
        let pos = self.index.remove(&id)?;
        let seat = self.seats.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(seat)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Seat<X>> {
        let pos = *self.index.get(&id)?;
        self.seats.get_mut(pos)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.seats.iter().map(|seat| seat.session.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seat<X>> {
        self.seats.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Seat<X>> {
        self.seats.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.seats
            .iter()
            .filter(|seat| seat.session.role() == role)
            .count()
    }

    /// Remove every seat, in admission order
    pub fn drain(&mut self) -> Vec<Seat<X>> {
        self.index.clear();
        std::mem::take(&mut self.seats)
    }
}

impl<X> Default for Roster<X> {
    fn default() -> Self {
        Self::new()
    }
}
