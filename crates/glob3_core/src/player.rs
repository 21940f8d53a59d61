//! Players and their event subscriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::{Callbacks, Event, EventKind, Subscriber, SubscriberId};
use crate::game::World;

/// Player identifier, unique within a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Who controls a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Local or remote human.
    #[default]
    Human,
    /// Computer controlled.
    Ai,
}

/// The read-only part of a player handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    id: PlayerId,
    name: String,
    kind: PlayerKind,
}

impl PlayerInfo {
    /// Create player details.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    /// Player id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller kind.
    #[must_use]
    pub const fn kind(&self) -> PlayerKind {
        self.kind
    }
}

/// A participant in the game and the subscribers acting on its behalf.
#[derive(Debug)]
pub struct Player {
    info: PlayerInfo,
    callbacks: Callbacks,
}

impl Player {
    /// A player with no subscribers.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            info: PlayerInfo::new(id, name, kind),
            callbacks: Callbacks::new(),
        }
    }

    /// Player details.
    #[must_use]
    pub const fn info(&self) -> &PlayerInfo {
        &self.info
    }

    /// Player id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.info.id
    }

    /// This player's subscribers.
    #[must_use]
    pub const fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Mutable access to this player's subscribers.
    pub fn callbacks_mut(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    /// Shorthand for [`Callbacks::register`].
    pub fn register<S>(&mut self, subscriber: S, kinds: &[EventKind]) -> SubscriberId
    where
        S: Subscriber + 'static,
    {
        self.callbacks.register(Box::new(subscriber), kinds)
    }

    pub(crate) fn dispatch(&mut self, event: Event<'_>, world: &mut World) {
        self.callbacks.dispatch(event, world, &self.info);
    }
}
