//! Lobby: where every session starts and returns to between games.

use crate::game::{Capacity, Game, GameError, GameKind, Outbox, Roster, TickContext};
use crate::input::map_lobby_key;
use crate::scheduler::SchedulerStats;
use crate::session::Session;
use crate::term::Vt100;
use crate::types::{ClearMode, Color, FlushStatus, LobbyAction, Shade, LOBBY_REFRESH_TICKS};

/// Row of the open-games counter
const GAMES_ROW: u16 = 2;
/// Row of the frame time readout
const FRAME_ROW: u16 = 3;
const GAMES_LABEL: &str = "Currently opened games: ";
const FRAME_LABEL: &str = "Average frame processing time: ";

/// One selectable game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub key: u8,
    pub kind: GameKind,
    pub title: &'static str,
}

/// Number the playable kinds from 1 in registration order
pub fn numbered_menu(kinds: &[(GameKind, &'static str)]) -> Vec<MenuEntry> {
    kinds
        .iter()
        .zip(1u8..=9)
        .map(|(&(kind, title), key)| MenuEntry { key, kind, title })
        .collect()
}

#[derive(Debug)]
pub struct Lobby {
    menu: Vec<MenuEntry>,
    roster: Roster<()>,
    /// Ticks until the next status refresh
    refresh_in: u32,
    /// Status shown by the last refresh
    shown: SchedulerStats,
}

impl Lobby {
    pub fn new(menu: Vec<MenuEntry>) -> Self {
        Self {
            menu,
            roster: Roster::new(),
            refresh_in: 0,
            shown: SchedulerStats::default(),
        }
    }
}

/// Handle one session's pending keys; stops at the first key that makes it leave.
fn read_keys(
    session: &mut Session,
    menu: &[MenuEntry],
    shown: &SchedulerStats,
) -> Option<Departure> {
    while let Some(key) = session.vt().read_char() {
        match map_lobby_key(key) {
            Some(LobbyAction::Select(digit)) => {
                if let Some(entry) = menu.iter().find(|entry| entry.key == digit) {
                    return Some(Departure::HandOff(entry.kind));
                }
            }
            Some(LobbyAction::ToggleColors) => {
                session.toggle_color();
                render_menu(session, menu, shown);
            }
            Some(LobbyAction::ToggleRole) => {
                session.set_role(session.role().toggled());
                render_menu(session, menu, shown);
            }
            Some(LobbyAction::Exit) => return Some(Departure::Exit),
            None => {}
        }
    }
    None
}

enum Departure {
    HandOff(GameKind),
    Exit,
}

impl Game for Lobby {
    fn kind(&self) -> GameKind {
        GameKind::LOBBY
    }

    fn max_players(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn player_count(&self) -> usize {
        self.roster.len()
    }

    fn session_count(&self) -> usize {
        self.roster.len()
    }

    fn persistent(&self) -> bool {
        true
    }

    fn add_player(&mut self, mut session: Session) {
        session.vt().set_cursor_visible(false);
        session.vt().bell();
        render_menu(&mut session, &self.menu, &self.shown);
        self.roster.insert(session, ());
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<(), GameError> {
        for id in self.roster.ids() {
            let Some(seat) = self.roster.get_mut(id) else {
                continue;
            };
            let Some(departure) = read_keys(&mut seat.session, &self.menu, &self.shown) else {
                continue;
            };
            let Some(seat) = self.roster.remove(id) else {
                continue;
            };
            match departure {
                Departure::HandOff(kind) => ctx.outbox.hand_off(kind, seat.session),
                Departure::Exit => ctx.outbox.release(seat.session),
            }
        }

        if self.refresh_in == 0 {
            self.refresh_in = LOBBY_REFRESH_TICKS;
            self.shown = *ctx.stats;
            for seat in self.roster.iter_mut() {
                if !seat.session.vt().is_congested() {
                    render_status(&mut seat.session, &self.shown);
                }
            }
        } else {
            self.refresh_in -= 1;
        }

        for id in self.roster.ids() {
            let lost = self
                .roster
                .get_mut(id)
                .map(|seat| seat.session.vt().flush() == FlushStatus::Error)
                .unwrap_or(false);
            if lost {
                if let Some(seat) = self.roster.remove(id) {
                    ctx.outbox.player_left(seat.session, true);
                }
            }
        }
        Ok(())
    }

    fn kill_game(&mut self, outbox: &mut Outbox) {
        for seat in self.roster.drain() {
            outbox.release(seat.session);
        }
        outbox.killed();
    }
}

fn palette(session: &Session) -> (Shade, Shade) {
    if session.color() {
        (Shade::bright(Color::Blue), Shade::bright(Color::Yellow))
    } else {
        (Shade::normal(Color::Black), Shade::normal(Color::White))
    }
}

fn render_menu(session: &mut Session, menu: &[MenuEntry], shown: &SchedulerStats) {
    let (background, text) = palette(session);
    let color = session.color();
    let role = session.role();
    let vt = session.vt();

    vt.set_background(background);
    vt.set_foreground(text);
    vt.clear_screen(ClearMode::Entire);
    vt.set_cursor(0, 0);
    vt.write_text("Welcome on TelnetArcade!");
    write_status(vt, shown);

    vt.set_cursor(0, 5);
    vt.write_text("Select game:");
    let mut row = 6;
    for entry in menu {
        vt.set_cursor(0, row);
        vt.write_text(&format!("{}: {}", entry.key, entry.title));
        row += 1;
    }

    row += 1;
    vt.set_cursor(0, row);
    vt.write_text("E - Exit, C - ");
    vt.write_text(if color { "Disable" } else { "Enable" });
    vt.write_text(" aixterm colors");
    vt.set_cursor(0, row + 1);
    vt.write_text("S - Join games as ");
    vt.write_text(role.toggled().as_str());
    vt.write_text(" (now ");
    vt.write_text(role.as_str());
    vt.write_text(")");
}

/// Rewrite only the two status values
fn render_status(session: &mut Session, shown: &SchedulerStats) {
    let (background, text) = palette(session);
    let vt = session.vt();
    vt.set_background(background);
    vt.set_foreground(text);
    write_status(vt, shown);
}

fn write_status(vt: &mut Vt100, shown: &SchedulerStats) {
    vt.set_cursor(0, GAMES_ROW);
    vt.clear_line(ClearMode::CursorToEnd);
    vt.write_text(GAMES_LABEL);
    vt.write_text(&shown.open_games.to_string());
    vt.set_cursor(0, FRAME_ROW);
    vt.clear_line(ClearMode::CursorToEnd);
    vt.write_text(FRAME_LABEL);
    vt.write_text(&format!("{}ms", shown.average_frame_ms()));
}
