//! # Globulation 3 Core
//!
//! Simulation core for Globulation 3: the terrain grid, resource growth,
//! the building registry, per-player event subscriptions and the tick loop.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No process-wide randomness (growth takes an injected sampler)
//! - No floating-point math (uses fixed-point)
//!
//! Renderers, AI, networking and input live outside the core and attach to
//! a [`game::Game`] as [`events::Subscriber`]s.
//!
//! ## Crate Structure
//!
//! - [`terrain`] - Cell terrain and resource deposits
//! - [`map`] - The terrain grid and its building registry
//! - [`growth`] - Resource growth and spreading
//! - [`buildings`] - Building table, instances and footprint lookup
//! - [`events`] - Subscriber trait and ordered dispatch
//! - [`player`] - Players and their subscriptions
//! - [`game`] - Lifecycle state machine and tick loop
//! - [`units`] - Unit event payloads
//! - [`config`] - Map and growth configuration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod growth;
pub mod map;
pub mod math;
pub mod player;
pub mod terrain;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{
        Building, BuildingFootprint, BuildingId, BuildingType, PlacementResult, MAX_BUILDING_LEVEL,
    };
    pub use crate::config::{CoreConfig, GrowthConfig, MapConfig};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{ChangeSet, EventKind, Subscriber, SubscriberId};
    pub use crate::game::{Game, GameState, TickLimit, World};
    pub use crate::growth::{grow, RandomSampler, ResourceGrowth, TileSampler};
    pub use crate::map::{Coord, Map};
    pub use crate::math::Fixed;
    pub use crate::player::{Player, PlayerId, PlayerInfo, PlayerKind};
    pub use crate::terrain::{ResourceKind, Terrain, TerrainType, MAX_TERRAIN_RESOURCES};
    pub use crate::units::{Unit, UnitDeath, UnitDeathCause, UnitEvent, UnitKind};
}
