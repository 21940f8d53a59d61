//! Game state machine and tick loop.
//!
//! A [`Game`] owns the shared [`World`] (map, lifecycle state, tick counter)
//! and the ordered list of [`Player`]s. [`Game::run`] drives the lifecycle:
//!
//! ```text
//! NotStarted -> Initializing -> Syncing -> Ticking (loop) -> Ending
//! ```
//!
//! - `Initializing`: `game_start` fires for every player in list order.
//! - `Syncing`: no callbacks.
//! - `Ticking`: each iteration fires `game_tick` for every player, then the
//!   map changes and unit events reported during that iteration.
//! - `Ending`: requested by a subscriber through [`World::end_game`]. The
//!   request is observed at the next iteration boundary; the remaining
//!   callbacks of the current iteration still run. `game_end` then fires
//!   exactly once per player. A request made during `game_start` is
//!   overwritten by `Syncing`, so the loop always runs at least once.
//!
//! Everything is synchronous and single threaded. Subscribers get `&mut World`
//! while they run, so they may mutate the map freely; they cannot touch the
//! player list.
//!
//! # Example
//!
//! ```
//! use glob3_core::game::{Game, TickLimit};
//! use glob3_core::events::EventKind;
//! use glob3_core::map::Map;
//! use glob3_core::player::{Player, PlayerId, PlayerKind};
//!
//! let mut game = Game::new(Map::create(16, 16));
//! let mut player = Player::new(PlayerId(1), "test", PlayerKind::Human);
//! player.register(TickLimit::new(10), &[EventKind::GameTick]);
//! game.add_player(player).unwrap();
//!
//! game.run();
//! assert_eq!(game.world().tick(), 10);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GameError, Result};
use crate::events::{ChangeSet, Event, Subscriber};
use crate::map::Map;
use crate::player::{Player, PlayerId, PlayerInfo};
use crate::units::{UnitDeath, UnitEvent};

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Created, `run` not called yet.
    #[default]
    NotStarted,
    /// Firing `game_start`.
    Initializing,
    /// Between start and the first tick.
    Syncing,
    /// Inside a loop iteration.
    Ticking,
    /// Loop finished or termination requested.
    Ending,
}

/// Shared state handed to every subscriber.
#[derive(Debug)]
pub struct World {
    state: GameState,
    tick: u64,
    map: Map,
    pending_changes: ChangeSet,
    pending_spawns: Vec<UnitEvent>,
    pending_deaths: Vec<UnitDeath>,
}

impl World {
    /// A world around `map` that has not started.
    #[must_use]
    pub fn new(map: Map) -> Self {
        Self {
            state: GameState::NotStarted,
            tick: 0,
            map,
            pending_changes: ChangeSet::new(),
            pending_spawns: Vec::new(),
            pending_deaths: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Request termination. Takes effect at the end of the current
    /// iteration.
    pub fn end_game(&mut self) {
        if self.state != GameState::Ending {
            debug!(tick = self.tick, "end of game requested");
        }
        self.state = GameState::Ending;
    }

    /// Whether termination has been requested.
    #[must_use]
    pub fn is_ending(&self) -> bool {
        self.state == GameState::Ending
    }

    /// Number of the current iteration, starting at 1. 0 before the first
    /// tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The map.
    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable access to the map.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Queue changed cells for this iteration's `map_change` firing.
    pub fn report_map_changes(&mut self, mut changes: ChangeSet) {
        self.pending_changes.append(&mut changes);
    }

    /// Queue a single changed cell.
    pub fn report_map_change(&mut self, x: u32, y: u32) {
        self.pending_changes.push(x, y);
    }

    /// Queue a `unit_spawn` event for the end of this iteration.
    pub fn report_unit_spawn(&mut self, event: UnitEvent) {
        self.pending_spawns.push(event);
    }

    /// Queue a `unit_die` event for the end of this iteration.
    pub fn report_unit_death(&mut self, death: UnitDeath) {
        self.pending_deaths.push(death);
    }

    /// Hash of the tick counter and map contents.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.map.state_hash().hash(&mut hasher);
        hasher.finish()
    }
}

/// A game: one map, several players, one lifecycle.
#[derive(Debug)]
pub struct Game {
    world: World,
    players: Vec<Player>,
    network_enabled: bool,
}

impl Game {
    /// A game on `map` with no players.
    #[must_use]
    pub fn new(map: Map) -> Self {
        Self {
            world: World::new(map),
            players: Vec::new(),
            network_enabled: true,
        }
    }

    /// Set whether networking collaborators may be attached. The core
    /// itself has no network behaviour.
    #[must_use]
    pub fn with_network(mut self, enabled: bool) -> Self {
        self.network_enabled = enabled;
        self
    }

    /// Whether networking is enabled for this game.
    #[must_use]
    pub const fn network_enabled(&self) -> bool {
        self.network_enabled
    }

    /// Append a player. Players receive events in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if the game already started or a
    /// player with the same id exists.
    pub fn add_player(&mut self, player: Player) -> Result<PlayerId> {
        if self.world.state != GameState::NotStarted {
            return Err(GameError::InvalidState(format!(
                "cannot add {} after the game started",
                player.id()
            )));
        }
        let id = player.id();
        if self.players.iter().any(|existing| existing.id() == id) {
            return Err(GameError::InvalidState(format!("{id} already joined")));
        }
        debug!(player = id.0, name = player.info().name(), "player joined");
        self.players.push(player);
        Ok(id)
    }

    /// Players in event order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if no player has this id.
    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|player| player.id() == id)
            .ok_or(GameError::UnknownPlayer(id.0))
    }

    /// Look up a player for registering subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if no player has this id.
    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id() == id)
            .ok_or(GameError::UnknownPlayer(id.0))
    }

    /// Shared world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world state, e.g. to prepare the map before `run`.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.world.state
    }

    /// Run the game to completion. Blocks until a subscriber ends it.
    ///
    /// A game without any subscriber that calls [`World::end_game`] never
    /// returns.
    ///
    /// # Panics
    ///
    /// Panics if the game is not in [`GameState::NotStarted`].
    pub fn run(&mut self) {
        assert_eq!(
            self.world.state,
            GameState::NotStarted,
            "a game can only be run once"
        );

        info!(
            players = self.players.len(),
            size_x = self.world.map.size_x(),
            size_y = self.world.map.size_y(),
            "game starting"
        );
        self.world.state = GameState::Initializing;
        self.fire(Event::GameStart);

        // Ending is only honoured from the loop; a request made during
        // game_start is overwritten here.
        if self.world.is_ending() {
            debug!("end requested during game_start ignored");
        }
        self.world.state = GameState::Syncing;
        debug!("syncing");

        while !self.world.is_ending() {
            self.world.state = GameState::Ticking;
            self.world.tick += 1;
            self.fire(Event::GameTick);
            self.flush_reports();
        }

        self.fire(Event::GameEnd);
        info!(ticks = self.world.tick, "game ended");
    }

    /// Release the game, handing the map and players back to the caller.
    #[must_use]
    pub fn into_parts(self) -> (Map, Vec<Player>) {
        (self.world.map, self.players)
    }

    fn fire(&mut self, event: Event<'_>) {
        for player in &mut self.players {
            player.dispatch(event, &mut self.world);
        }
    }

    /// Deliver what subscribers reported during this iteration.
    fn flush_reports(&mut self) {
        let changes = std::mem::take(&mut self.world.pending_changes);
        if !changes.is_empty() {
            self.fire(Event::MapChange(&changes));
        }

        let spawns = std::mem::take(&mut self.world.pending_spawns);
        for spawn in &spawns {
            self.fire(Event::UnitSpawn(spawn));
        }

        let deaths = std::mem::take(&mut self.world.pending_deaths);
        for death in &deaths {
            self.fire(Event::UnitDie(death));
        }
    }
}

/// Subscriber that ends the game after a fixed number of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLimit {
    limit: u64,
}

impl TickLimit {
    /// End the game once `limit` ticks have run. The loop always runs at
    /// least once, so a limit of 0 behaves like 1.
    #[must_use]
    pub const fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl Subscriber for TickLimit {
    fn on_game_tick(&mut self, world: &mut World, _player: &PlayerInfo) {
        if world.tick() >= self.limit {
            world.end_game();
        }
    }
}
