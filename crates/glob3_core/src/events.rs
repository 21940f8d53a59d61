//! Ordered, per-player event subscription and synchronous dispatch.
//!
//! Each player owns a [`Callbacks`] set: an arena of subscriber objects
//! addressed by [`SubscriberId`] and one ordered id list per [`EventKind`].
//! A subscriber may appear in several lists (a renderer typically listens to
//! start, tick and end) but is stored once.
//!
//! # Dispatch contract
//!
//! - Registration appends; invocation follows registration order exactly.
//! - One firing walks the whole list once and hands every subscriber the same
//!   payload.
//! - Dispatch is synchronous and non-reentrant: a subscriber runs to
//!   completion before the next one starts. Lists cannot change during a
//!   dispatch because the dispatcher holds the only `&mut` to them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::game::World;
use crate::map::Coord;
use crate::player::PlayerInfo;
use crate::units::{UnitDeath, UnitEvent};

/// Lifecycle events a player can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The game entered `Initializing`.
    GameStart,
    /// One loop iteration.
    GameTick,
    /// The loop finished.
    GameEnd,
    /// Cells changed during the last tick.
    MapChange,
    /// A unit appeared.
    UnitSpawn,
    /// A unit died.
    UnitDie,
}

impl EventKind {
    /// All event kinds.
    pub const ALL: [Self; 6] = [
        Self::GameStart,
        Self::GameTick,
        Self::GameEnd,
        Self::MapChange,
        Self::UnitSpawn,
        Self::UnitDie,
    ];

    /// Number of event kinds.
    pub const COUNT: usize = Self::ALL.len();

    const fn index(self) -> usize {
        match self {
            Self::GameStart => 0,
            Self::GameTick => 1,
            Self::GameEnd => 2,
            Self::MapChange => 3,
            Self::UnitSpawn => 4,
            Self::UnitDie => 5,
        }
    }
}

/// Ordered list of cells mutated during one tick.
///
/// Duplicates are kept: a cell changed twice appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet(Vec<Coord>);

impl ChangeSet {
    /// An empty change-set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a changed cell.
    pub fn push(&mut self, x: u32, y: u32) {
        self.0.push((x, y));
    }

    /// Append another change-set, keeping order.
    pub fn append(&mut self, other: &mut Self) {
        self.0.append(&mut other.0);
    }

    /// Number of recorded changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Changes in the order they happened.
    #[must_use]
    pub fn as_slice(&self) -> &[Coord] {
        &self.0
    }

    /// Iterate over changes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Coord> {
        self.0.iter()
    }
}

impl FromIterator<Coord> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = Coord>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One firing of an event, with its payload.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// See [`EventKind::GameStart`].
    GameStart,
    /// See [`EventKind::GameTick`].
    GameTick,
    /// See [`EventKind::GameEnd`].
    GameEnd,
    /// See [`EventKind::MapChange`].
    MapChange(&'a ChangeSet),
    /// See [`EventKind::UnitSpawn`].
    UnitSpawn(&'a UnitEvent),
    /// See [`EventKind::UnitDie`].
    UnitDie(&'a UnitDeath),
}

impl Event<'_> {
    /// The list this event is delivered to.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::GameStart => EventKind::GameStart,
            Self::GameTick => EventKind::GameTick,
            Self::GameEnd => EventKind::GameEnd,
            Self::MapChange(_) => EventKind::MapChange,
            Self::UnitSpawn(_) => EventKind::UnitSpawn,
            Self::UnitDie(_) => EventKind::UnitDie,
        }
    }
}

/// Something that reacts to game events.
///
/// Every method defaults to doing nothing, so an implementation only
/// overrides what it subscribes to. The collaborator's own state (a window,
/// a connection, an AI) lives inside the implementing type.
pub trait Subscriber {
    /// The game is starting.
    fn on_game_start(&mut self, _world: &mut World, _player: &PlayerInfo) {}

    /// One loop iteration. Call [`World::end_game`] to stop the loop after
    /// the current iteration.
    fn on_game_tick(&mut self, _world: &mut World, _player: &PlayerInfo) {}

    /// The loop has finished.
    fn on_game_end(&mut self, _world: &mut World, _player: &PlayerInfo) {}

    /// Cells changed during the tick that just ran.
    fn on_map_change(&mut self, _world: &mut World, _player: &PlayerInfo, _changes: &ChangeSet) {}

    /// A unit appeared.
    fn on_unit_spawn(&mut self, _world: &mut World, _player: &PlayerInfo, _event: &UnitEvent) {}

    /// A unit died.
    fn on_unit_die(&mut self, _world: &mut World, _player: &PlayerInfo, _death: &UnitDeath) {}
}

/// Handle to a subscriber registered with one player's [`Callbacks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u32);

/// A player's subscribers and per-event invocation lists.
#[derive(Default)]
pub struct Callbacks {
    subscribers: Vec<Option<Box<dyn Subscriber>>>,
    lists: [Vec<SubscriberId>; EventKind::COUNT],
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lists = f.debug_map();
        for kind in EventKind::ALL {
            lists.entry(&kind, &self.lists[kind.index()]);
        }
        lists.finish()
    }
}

impl Callbacks {
    /// No subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a subscriber without subscribing it to anything yet.
    pub fn add(&mut self, subscriber: Box<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.subscribers.len() as u32);
        self.subscribers.push(Some(subscriber));
        id
    }

    /// Store a subscriber and append it to the list of every kind in `kinds`.
    pub fn register(&mut self, subscriber: Box<dyn Subscriber>, kinds: &[EventKind]) -> SubscriberId {
        let id = self.add(subscriber);
        for &kind in kinds {
            self.lists[kind.index()].push(id);
        }
        id
    }

    /// Append `id` to the tail of the `kind` list.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownSubscriber`] if `id` was never added or
    /// has been removed.
    pub fn subscribe(&mut self, kind: EventKind, id: SubscriberId) -> Result<()> {
        if !self.contains(id) {
            return Err(GameError::UnknownSubscriber(id.0));
        }
        self.lists[kind.index()].push(id);
        Ok(())
    }

    /// Remove every occurrence of `id` from the `kind` list.
    ///
    /// Returns `true` if anything was removed.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriberId) -> bool {
        let list = &mut self.lists[kind.index()];
        let before = list.len();
        list.retain(|&entry| entry != id);
        list.len() != before
    }

    /// Drop a subscriber and take it off every list.
    pub fn remove(&mut self, id: SubscriberId) -> Option<Box<dyn Subscriber>> {
        let slot = self.subscribers.get_mut(id.0 as usize)?.take()?;
        for list in &mut self.lists {
            list.retain(|&entry| entry != id);
        }
        Some(slot)
    }

    /// Whether `id` refers to a live subscriber.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        matches!(self.subscribers.get(id.0 as usize), Some(Some(_)))
    }

    /// Subscribers of `kind`, in invocation order.
    #[must_use]
    pub fn subscribed(&self, kind: EventKind) -> &[SubscriberId] {
        &self.lists[kind.index()]
    }

    /// Deliver `event` to every subscriber of its kind, in order.
    pub fn dispatch(&mut self, event: Event<'_>, world: &mut World, player: &PlayerInfo) {
        let Self { subscribers, lists } = self;

        for id in &lists[event.kind().index()] {
            let Some(Some(subscriber)) = subscribers.get_mut(id.0 as usize) else {
                continue;
            };
            match event {
                Event::GameStart => subscriber.on_game_start(world, player),
                Event::GameTick => subscriber.on_game_tick(world, player),
                Event::GameEnd => subscriber.on_game_end(world, player),
                Event::MapChange(changes) => subscriber.on_map_change(world, player, changes),
                Event::UnitSpawn(spawn) => subscriber.on_unit_spawn(world, player, spawn),
                Event::UnitDie(death) => subscriber.on_unit_die(world, player, death),
            }
        }
    }
}
