//! Game registry: maps a game kind to the factory that builds instances.

use crate::game::{Game, GameKind};

pub type GameFactory = Box<dyn Fn() -> Box<dyn Game> + Send>;

struct Entry {
    kind: GameKind,
    title: &'static str,
    factory: GameFactory,
}

/// Registered game kinds, in registration order
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: GameKind, title: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn Game> + Send + 'static,
    {
        let entry = Entry {
            kind,
            title,
            factory: Box::new(factory),
        };
        match self.entries.iter_mut().find(|e| e.kind == kind) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn create(&self, kind: GameKind) -> Option<Box<dyn Game>> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| (e.factory)())
    }

    pub fn contains(&self, kind: GameKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Kinds a player can pick from the lobby menu, with their titles
    pub fn menu(&self) -> Vec<(GameKind, &'static str)> {
        self.entries
            .iter()
            .filter(|e| e.kind != GameKind::LOBBY)
            .map(|e| (e.kind, e.title))
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.kind))
            .finish()
    }
}
