//! Scheduler: owns every live game instance and the fixed-period loop.
//!
//! The scheduler thread is the only place where time advances. Each
//! iteration it admits newly connected sessions into the lobby, ticks every
//! instance that has enough players, and reacts to the notifications the
//! games raised: destroying instances, returning departed sessions to the
//! lobby, or admitting handed-off sessions into their next game.
//!
//! A tick that returns an error or panics destroys only the instance that
//! raised it. Its remaining sessions are disconnected when the instance is
//! dropped.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::game::{Game, GameError, GameEvent, GameKind, Outbox, TickContext};
use crate::registry::Registry;
use crate::session::Session;
use crate::types::{Role, STATS_WINDOW, TICK_MS};

/// Scheduler diagnostics, polled by the lobby each refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Live instances other than lobbies
    pub open_games: usize,
    pub live_instances: usize,
    /// Mean iteration processing time over the last full window
    pub average_frame: Duration,
    pub last_frame: Duration,
    /// Iterations whose processing time reached the period
    pub overruns: u64,
    pub iterations: u64,
}

impl SchedulerStats {
    pub fn average_frame_ms(&self) -> u128 {
        self.average_frame.as_millis()
    }
}

/// Scheduler-assigned instance identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameId(u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Read-only view of one live instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceInfo {
    pub id: GameId,
    pub kind: GameKind,
    pub players: usize,
    pub sessions: usize,
}

/// A session could not be admitted; the session comes back to the caller.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("no game registered as {kind}")]
    UnknownKind {
        kind: GameKind,
        session: Box<Session>,
    },
    #[error("no {kind} game to watch")]
    NothingToWatch {
        kind: GameKind,
        session: Box<Session>,
    },
    #[error("limit of {limit} open games reached")]
    AtCapacity {
        limit: usize,
        session: Box<Session>,
    },
}

impl AdmissionError {
    pub fn session(&self) -> &Session {
        match self {
            AdmissionError::UnknownKind { session, .. }
            | AdmissionError::NothingToWatch { session, .. }
            | AdmissionError::AtCapacity { session, .. } => session,
        }
    }

    pub fn into_session(self) -> Session {
        match self {
            AdmissionError::UnknownKind { session, .. }
            | AdmissionError::NothingToWatch { session, .. }
            | AdmissionError::AtCapacity { session, .. } => *session,
        }
    }
}

struct Instance {
    id: GameId,
    kind: GameKind,
    game: Box<dyn Game>,
}

pub struct Scheduler {
    registry: Registry,
    games: Vec<Instance>,
    next_game_id: u64,
    period: Duration,
    max_games: Option<usize>,
    stats: SchedulerStats,
    window_total: Duration,
    window_frames: u32,
    shutting_down: bool,
}

impl Scheduler {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            games: Vec::new(),
            next_game_id: 1,
            period: Duration::from_millis(TICK_MS),
            max_games: None,
            stats: SchedulerStats::default(),
            window_total: Duration::ZERO,
            window_frames: 0,
            shutting_down: false,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Bound the number of simultaneously open non-lobby instances
    pub fn with_max_games(mut self, max_games: Option<usize>) -> Self {
        self.max_games = max_games;
        self
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn instances(&self) -> Vec<InstanceInfo> {
        self.games
            .iter()
            .map(|instance| InstanceInfo {
                id: instance.id,
                kind: instance.kind,
                players: instance.game.player_count(),
                sessions: instance.game.session_count(),
            })
            .collect()
    }

    /// Put a session into a game of `kind`.
    ///
    /// Players join the first instance with room; spectators join the first
    /// instance of that kind regardless of its bound. When no instance fits a
    /// player, a new one is created.
    pub fn admit(&mut self, session: Session, kind: GameKind) -> Result<GameId, AdmissionError> {
        let spectator = session.role() == Role::Spectator;
        let existing = self.games.iter().position(|instance| {
            instance.kind == kind
                && (spectator || instance.game.max_players().has_room(instance.game.player_count()))
        });

        let idx = match existing {
            Some(idx) => idx,
            None => {
                if spectator && kind != GameKind::LOBBY {
                    return Err(AdmissionError::NothingToWatch {
                        kind,
                        session: Box::new(session),
                    });
                }
                if let Some(limit) = self.limit_reached(kind) {
                    return Err(AdmissionError::AtCapacity {
                        limit,
                        session: Box::new(session),
                    });
                }
                let Some(game) = self.registry.create(kind) else {
                    return Err(AdmissionError::UnknownKind {
                        kind,
                        session: Box::new(session),
                    });
                };
                self.push_instance(kind, game)
            }
        };

        let instance = &mut self.games[idx];
        let id = instance.id;
        info!(
            session = %session.id(),
            game = %kind,
            instance = %id,
            role = session.role().as_str(),
            "session admitted"
        );
        instance.game.add_player(session);
        self.refresh_counts();
        Ok(id)
    }

    /// Admit a session, falling back to the lobby when `kind` refuses it.
    ///
    /// A session the lobby refuses too is disconnected.
    pub fn route(&mut self, session: Session, kind: GameKind) {
        let err = match self.admit(session, kind) {
            Ok(_) => return,
            Err(err) => err,
        };
        warn!(game = %kind, error = %err, "admission rejected");

        let session = err.into_session();
        if kind == GameKind::LOBBY {
            session.goodbye();
            return;
        }
        if let Err(err) = self.admit(session, GameKind::LOBBY) {
            warn!(error = %err, "lobby unavailable, closing session");
            err.into_session().goodbye();
        }
    }

    /// Tick every instance that has enough players, then handle what they raised.
    pub fn tick_all(&mut self) {
        let ids: Vec<GameId> = self.games.iter().map(|instance| instance.id).collect();
        for id in ids {
            self.tick_instance(id);
        }
        self.kill_abandoned();
        self.reap_empty();
        self.refresh_counts();
    }

    /// End games whose last player left while spectators remain.
    fn kill_abandoned(&mut self) {
        let abandoned: Vec<GameId> = self
            .games
            .iter()
            .filter(|instance| {
                !instance.game.persistent()
                    && instance.game.player_count() == 0
                    && instance.game.session_count() > 0
            })
            .map(|instance| instance.id)
            .collect();
        for id in abandoned {
            debug!(instance = %id, "last player gone, ending game");
            self.kill(id);
        }
    }

    fn tick_instance(&mut self, id: GameId) {
        let stats = self.stats;
        // an earlier instance's events may have removed this one
        let Some(instance) = self.games.iter_mut().find(|instance| instance.id == id) else {
            return;
        };
        if instance.game.player_count() < instance.game.min_players() {
            return;
        }

        let kind = instance.kind;
        let mut outbox = Outbox::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = TickContext {
                stats: &stats,
                outbox: &mut outbox,
            };
            instance.game.tick(&mut ctx)
        }));

        let fault = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(payload) => Some(GameError::from_panic(payload)),
        };
        if let Some(err) = fault {
            error!(game = %kind, instance = %id, error = %err, "game faulted, destroying instance");
            self.remove_instance(id);
        }

        self.dispatch(id, kind, outbox.into_events());
    }

    /// Force an instance to end. Returns false if it was not live.
    pub fn kill(&mut self, id: GameId) -> bool {
        let Some(instance) = self.games.iter_mut().find(|instance| instance.id == id) else {
            return false;
        };
        let kind = instance.kind;
        let mut outbox = Outbox::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            instance.game.kill_game(&mut outbox)
        }));
        if let Err(payload) = result {
            let err = GameError::from_panic(payload);
            error!(game = %kind, instance = %id, error = %err, "kill failed");
        }

        self.dispatch(id, kind, outbox.into_events());
        self.remove_instance(id);
        self.refresh_counts();
        true
    }

    /// Kill every instance; all sessions are disconnected cleanly.
    pub fn shutdown(&mut self) {
        self.shutting_down = true;
        let ids: Vec<GameId> = self.games.iter().map(|instance| instance.id).collect();
        for id in ids {
            self.kill(id);
        }
        self.games.clear();
        self.refresh_counts();
        info!("scheduler shut down");
    }

    /// Drive the loop until the arrival channel closes.
    ///
    /// Sessions received on `arrivals` are admitted into the lobby at the
    /// start of the next iteration.
    pub fn run(&mut self, mut arrivals: UnboundedReceiver<Session>) {
        info!(period_ms = self.period.as_millis() as u64, "scheduler started");

        loop {
            let started = Instant::now();

            loop {
                match arrivals.try_recv() {
                    Ok(session) => self.route(session, GameKind::LOBBY),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.shutdown();
                        return;
                    }
                }
            }

            self.tick_all();

            let elapsed = started.elapsed();
            self.record_frame(elapsed);
            if let Some(rest) = self.period.checked_sub(elapsed) {
                thread::sleep(rest);
            }
        }
    }

    fn dispatch(&mut self, origin: GameId, origin_kind: GameKind, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Killed => {
                    if self.remove_instance(origin) {
                        info!(game = %origin_kind, instance = %origin, "game ended");
                    }
                }
                GameEvent::PlayerLeft {
                    session,
                    connection_lost: true,
                } => {
                    info!(session = %session.id(), game = %origin_kind, "connection lost");
                    session.close();
                }
                GameEvent::PlayerLeft {
                    session,
                    connection_lost: false,
                } => {
                    if origin_kind == GameKind::LOBBY || self.shutting_down {
                        info!(session = %session.id(), "client disconnected");
                        session.goodbye();
                    } else {
                        debug!(session = %session.id(), game = %origin_kind, "back to lobby");
                        self.route(session, GameKind::LOBBY);
                    }
                }
                GameEvent::HandedOff { target, session } => {
                    if self.shutting_down {
                        session.goodbye();
                    } else {
                        debug!(session = %session.id(), from = %origin_kind, to = %target, "handoff");
                        self.route(session, target);
                    }
                }
            }
        }
    }

    fn limit_reached(&self, kind: GameKind) -> Option<usize> {
        if kind == GameKind::LOBBY {
            return None;
        }
        self.max_games
            .filter(|&limit| self.open_games() >= limit)
    }

    fn push_instance(&mut self, kind: GameKind, game: Box<dyn Game>) -> usize {
        let id = GameId(self.next_game_id);
        self.next_game_id += 1;
        info!(game = %kind, instance = %id, "game created");
        self.games.push(Instance { id, kind, game });
        self.games.len() - 1
    }

    fn remove_instance(&mut self, id: GameId) -> bool {
        let before = self.games.len();
        self.games.retain(|instance| instance.id != id);
        self.games.len() != before
    }

    fn reap_empty(&mut self) {
        self.games.retain(|instance| {
            let keep = instance.game.persistent() || instance.game.session_count() > 0;
            if !keep {
                debug!(game = %instance.kind, instance = %instance.id, "dropping empty instance");
            }
            keep
        });
    }

    fn open_games(&self) -> usize {
        self.games
            .iter()
            .filter(|instance| instance.kind != GameKind::LOBBY)
            .count()
    }

    fn refresh_counts(&mut self) {
        self.stats.open_games = self.open_games();
        self.stats.live_instances = self.games.len();
    }

    fn record_frame(&mut self, elapsed: Duration) {
        self.stats.iterations += 1;
        self.stats.last_frame = elapsed;
        self.window_total += elapsed;
        self.window_frames += 1;
        if self.window_frames >= STATS_WINDOW {
            self.stats.average_frame = self.window_total / self.window_frames;
            self.window_total = Duration::ZERO;
            self.window_frames = 0;
        }
        if elapsed >= self.period {
            self.stats.overruns += 1;
            warn!(elapsed_ms = elapsed.as_millis() as u64, "tick overran its period");
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("registry", &self.registry)
            .field("instances", &self.instances())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::game::{Capacity, Roster};
    use crate::session::SessionId;
    use crate::term::{memory_pair, MemoryPeer, SendMode, Vt100};

    const DUEL: GameKind = GameKind::new("duel");
    const BROKEN: GameKind = GameKind::new("broken");
    const PANICKY: GameKind = GameKind::new("panicky");
    const QUITTER: GameKind = GameKind::new("quitter");
    const SOLO: GameKind = GameKind::new("solo");

    #[derive(Clone, Copy)]
    enum Behavior {
        Idle,
        Fail,
        Panic,
        ReleaseAll,
        ReleasePlayers,
    }

    struct Probe {
        kind: GameKind,
        min: usize,
        max: Capacity,
        persistent: bool,
        behavior: Behavior,
        roster: Roster<()>,
        ticks: Arc<AtomicUsize>,
    }

    impl Game for Probe {
        fn kind(&self) -> GameKind {
            self.kind
        }

        fn min_players(&self) -> usize {
            self.min
        }

        fn max_players(&self) -> Capacity {
            self.max
        }

        fn player_count(&self) -> usize {
            self.roster.count_role(Role::Player)
        }

        fn session_count(&self) -> usize {
            self.roster.len()
        }

        fn persistent(&self) -> bool {
            self.persistent
        }

        fn add_player(&mut self, session: Session) {
            self.roster.insert(session, ());
        }

        fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), GameError> {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Idle => {
                    for seat in self.roster.iter_mut() {
                        seat.session.vt().flush();
                    }
                    Ok(())
                }
                Behavior::Fail => Err(GameError::logic("board corrupted")),
                Behavior::Panic => panic!("index out of range"),
                Behavior::ReleaseAll => {
                    for seat in self.roster.drain() {
                        ctx.outbox.release(seat.session);
                    }
                    ctx.outbox.killed();
                    Ok(())
                }
                Behavior::ReleasePlayers => {
                    let players: Vec<SessionId> = self
                        .roster
                        .iter()
                        .filter(|seat| seat.session.role() == Role::Player)
                        .map(|seat| seat.session.id())
                        .collect();
                    for id in players {
                        if let Some(seat) = self.roster.remove(id) {
                            ctx.outbox.release(seat.session);
                        }
                    }
                    Ok(())
                }
            }
        }

        fn kill_game(&mut self, outbox: &mut Outbox) {
            for seat in self.roster.drain() {
                outbox.release(seat.session);
            }
            outbox.killed();
        }
    }

    struct Fixture {
        scheduler: Scheduler,
        ticks: Arc<AtomicUsize>,
    }

    fn probe_factory(
        kind: GameKind,
        min: usize,
        max: Capacity,
        behavior: Behavior,
        ticks: &Arc<AtomicUsize>,
    ) -> impl Fn() -> Box<dyn Game> + Send + 'static {
        let ticks = Arc::clone(ticks);
        move || {
            Box::new(Probe {
                kind,
                min,
                max,
                persistent: kind == GameKind::LOBBY,
                behavior,
                roster: Roster::new(),
                ticks: Arc::clone(&ticks),
            }) as Box<dyn Game>
        }
    }

    fn fixture() -> Fixture {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register(
            GameKind::LOBBY,
            "Lobby",
            probe_factory(GameKind::LOBBY, 0, Capacity::Unbounded, Behavior::Idle, &ticks),
        );
        registry.register(
            DUEL,
            "Duel",
            probe_factory(DUEL, 2, Capacity::Bounded(2), Behavior::Idle, &ticks),
        );
        registry.register(
            BROKEN,
            "Broken",
            probe_factory(BROKEN, 1, Capacity::Bounded(1), Behavior::Fail, &ticks),
        );
        registry.register(
            PANICKY,
            "Panicky",
            probe_factory(PANICKY, 1, Capacity::Bounded(1), Behavior::Panic, &ticks),
        );
        registry.register(
            QUITTER,
            "Quitter",
            probe_factory(QUITTER, 1, Capacity::Bounded(1), Behavior::ReleaseAll, &ticks),
        );
        registry.register(
            SOLO,
            "Solo",
            probe_factory(SOLO, 1, Capacity::Bounded(1), Behavior::ReleasePlayers, &ticks),
        );
        Fixture {
            scheduler: Scheduler::new(registry),
            ticks,
        }
    }

    fn session(role: Role) -> (Session, MemoryPeer) {
        let (transport, peer) = memory_pair();
        (Session::new(Vt100::bare(transport)).with_role(role), peer)
    }

    fn count(scheduler: &Scheduler, kind: GameKind) -> usize {
        scheduler
            .instances()
            .iter()
            .filter(|info| info.kind == kind)
            .count()
    }

    fn lobby_sessions(scheduler: &Scheduler) -> usize {
        scheduler
            .instances()
            .iter()
            .filter(|info| info.kind == GameKind::LOBBY)
            .map(|info| info.sessions)
            .sum()
    }

    #[test]
    fn third_player_opens_a_second_instance() {
        let mut f = fixture();
        let (a, _pa) = session(Role::Player);
        let (b, _pb) = session(Role::Player);
        let (c, _pc) = session(Role::Player);

        let first = f.scheduler.admit(a, DUEL).unwrap();
        assert_eq!(f.scheduler.admit(b, DUEL).unwrap(), first);
        let second = f.scheduler.admit(c, DUEL).unwrap();

        assert_ne!(first, second);
        let players: Vec<usize> = f
            .scheduler
            .instances()
            .iter()
            .map(|info| info.players)
            .collect();
        assert_eq!(players, vec![2, 1]);
        assert_eq!(f.scheduler.stats().open_games, 2);
    }

    #[test]
    fn spectators_ignore_the_player_bound() {
        let mut f = fixture();
        let (a, _pa) = session(Role::Player);
        let (b, _pb) = session(Role::Player);
        let (watcher, _pw) = session(Role::Spectator);

        let id = f.scheduler.admit(a, DUEL).unwrap();
        f.scheduler.admit(b, DUEL).unwrap();
        assert_eq!(f.scheduler.admit(watcher, DUEL).unwrap(), id);

        let info = f.scheduler.instances()[0];
        assert_eq!((info.players, info.sessions), (2, 3));
    }

    #[test]
    fn spectator_without_instance_is_rejected_with_session() {
        let mut f = fixture();
        let (watcher, _pw) = session(Role::Spectator);
        let watcher_id = watcher.id();

        let err = f.scheduler.admit(watcher, DUEL).unwrap_err();
        assert!(matches!(err, AdmissionError::NothingToWatch { .. }));
        assert_eq!(err.session().id(), watcher_id);
        assert!(f.scheduler.instances().is_empty());

        f.scheduler.route(err.into_session(), DUEL);
        assert_eq!(lobby_sessions(&f.scheduler), 1);
    }

    #[test]
    fn unknown_kind_routes_to_lobby() {
        let mut f = fixture();
        let (a, _pa) = session(Role::Player);
        f.scheduler.route(a, GameKind::new("chess"));
        assert_eq!(lobby_sessions(&f.scheduler), 1);
        assert_eq!(f.scheduler.stats().open_games, 0);
    }

    #[test]
    fn game_limit_rejects_new_instances_only() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register(
            DUEL,
            "Duel",
            probe_factory(DUEL, 2, Capacity::Bounded(2), Behavior::Idle, &ticks),
        );
        let mut scheduler = Scheduler::new(registry).with_max_games(Some(1));

        let (a, _pa) = session(Role::Player);
        let (b, _pb) = session(Role::Player);
        let (c, _pc) = session(Role::Player);
        scheduler.admit(a, DUEL).unwrap();
        scheduler.admit(b, DUEL).unwrap();
        let err = scheduler.admit(c, DUEL).unwrap_err();
        assert!(matches!(err, AdmissionError::AtCapacity { limit: 1, .. }));
    }

    #[test]
    fn instances_below_min_players_are_not_ticked() {
        let mut f = fixture();
        let (a, _pa) = session(Role::Player);
        f.scheduler.admit(a, DUEL).unwrap();

        f.scheduler.tick_all();
        assert_eq!(f.ticks.load(Ordering::SeqCst), 0);

        let (b, _pb) = session(Role::Player);
        f.scheduler.admit(b, DUEL).unwrap();
        f.scheduler.tick_all();
        assert_eq!(f.ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_tick_destroys_only_that_instance() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        let (b, pb) = session(Role::Player);
        let (c, pc) = session(Role::Player);
        f.scheduler.admit(a, BROKEN).unwrap();
        f.scheduler.admit(b, DUEL).unwrap();
        f.scheduler.admit(c, DUEL).unwrap();

        f.scheduler.tick_all();

        assert_eq!(count(&f.scheduler, BROKEN), 0);
        assert_eq!(count(&f.scheduler, DUEL), 1);
        assert!(pa.is_closed());
        assert!(!pb.is_closed());
        assert!(!pc.is_closed());
    }

    #[test]
    fn panicking_tick_is_contained() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        let (b, pb) = session(Role::Player);
        f.scheduler.admit(a, PANICKY).unwrap();
        f.scheduler.admit(b, QUITTER).unwrap();

        f.scheduler.tick_all();

        assert_eq!(count(&f.scheduler, PANICKY), 0);
        assert!(pa.is_closed());
        // The quitter's session went back to the lobby in the same pass.
        assert_eq!(lobby_sessions(&f.scheduler), 1);
        assert!(!pb.is_closed());
    }

    #[test]
    fn clean_leave_from_game_returns_to_lobby() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        f.scheduler.admit(a, QUITTER).unwrap();

        f.scheduler.tick_all();

        assert_eq!(count(&f.scheduler, QUITTER), 0);
        assert_eq!(lobby_sessions(&f.scheduler), 1);
        assert!(!pa.is_closed());
    }

    #[test]
    fn spectators_return_to_lobby_when_last_player_leaves() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        let (watcher, pw) = session(Role::Spectator);
        let id = f.scheduler.admit(a, SOLO).unwrap();
        assert_eq!(f.scheduler.admit(watcher, SOLO).unwrap(), id);

        f.scheduler.tick_all();

        assert_eq!(count(&f.scheduler, SOLO), 0);
        assert_eq!(lobby_sessions(&f.scheduler), 2);
        assert!(!pa.is_closed());
        assert!(!pw.is_closed());
        assert_eq!(f.scheduler.stats().open_games, 0);
    }

    #[test]
    fn lost_leave_closes_without_lobby() {
        let mut f = fixture();
        let (mut a, pa) = session(Role::Player);
        a.vt().write_text("frame");
        pa.set_send_mode(SendMode::Fail);
        f.scheduler.admit(a, QUITTER).unwrap();

        f.scheduler.tick_all();

        assert!(pa.is_closed());
        assert_eq!(count(&f.scheduler, QUITTER), 0);
        assert_eq!(lobby_sessions(&f.scheduler), 0);
    }

    #[test]
    fn kill_of_lobby_says_goodbye() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        let id = f.scheduler.admit(a, GameKind::LOBBY).unwrap();

        assert!(f.scheduler.kill(id));
        assert!(!f.scheduler.kill(id));
        assert_eq!(pa.take_sent(), b"\x1b[2J\x1bc");
        assert!(pa.is_closed());
    }

    #[test]
    fn shutdown_disconnects_everyone_cleanly() {
        let mut f = fixture();
        let (a, pa) = session(Role::Player);
        let (b, pb) = session(Role::Player);
        f.scheduler.admit(a, GameKind::LOBBY).unwrap();
        f.scheduler.admit(b, QUITTER).unwrap();

        f.scheduler.shutdown();

        assert!(f.scheduler.instances().is_empty());
        for peer in [pa, pb] {
            assert!(peer.is_closed());
            assert!(peer.take_sent().ends_with(b"\x1bc"));
        }
    }

    #[test]
    fn run_admits_arrivals_and_stops_when_sender_drops() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register(
            GameKind::LOBBY,
            "Lobby",
            probe_factory(GameKind::LOBBY, 0, Capacity::Unbounded, Behavior::Idle, &ticks),
        );
        let mut scheduler = Scheduler::new(registry).with_period(Duration::from_millis(1));

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (a, pa) = session(Role::Player);
        tx.send(a).unwrap();
        drop(tx);

        scheduler.run(rx);

        assert!(scheduler.instances().is_empty());
        assert!(pa.is_closed());
        assert_eq!(pa.take_sent(), b"\x1b[2J\x1bc");
    }

    #[test]
    fn frame_stats_average_over_window() {
        let f = fixture();
        let mut scheduler = f.scheduler.with_period(Duration::from_millis(50));
        for _ in 0..STATS_WINDOW {
            scheduler.record_frame(Duration::from_millis(4));
        }
        let stats = scheduler.stats();
        assert_eq!(stats.iterations, STATS_WINDOW as u64);
        assert_eq!(stats.average_frame_ms(), 4);
        assert_eq!(stats.overruns, 0);

        scheduler.record_frame(Duration::from_millis(80));
        assert_eq!(scheduler.stats().overruns, 1);
        assert_eq!(scheduler.stats().last_frame, Duration::from_millis(80));
    }
}
