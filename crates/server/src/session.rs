//! Sessions: one connected client's identity, preferences and terminal.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::term::Vt100;
use crate::types::{ClearMode, Role};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One client connection.
///
/// Exactly one game owns a session at a time; handing it to another game
/// moves the value. Dropping a session closes its transport.
pub struct Session {
    id: SessionId,
    role: Role,
    color: bool,
    vt: Vt100,
    peer: Option<SocketAddr>,
}

impl Session {
    pub fn new(vt: Vt100) -> Self {
        Self {
            id: SessionId::next(),
            role: Role::default(),
            color: false,
            vt,
            peer: None,
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    /// Whether the client's terminal gets the bright color set
    pub fn color(&self) -> bool {
        self.color
    }

    pub fn toggle_color(&mut self) {
        self.color = !self.color;
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn vt(&mut self) -> &mut Vt100 {
        &mut self.vt
    }

    /// Drop the connection without a goodbye.
    pub fn close(self) {
        drop(self);
    }

    /// Leave the terminal clean, then disconnect.
    pub fn goodbye(mut self) {
        self.vt.clear_screen(ClearMode::Entire);
        self.vt.reset();
        self.vt.flush();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.vt.close();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("color", &self.color)
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}
