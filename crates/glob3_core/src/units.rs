//! Unit identities and lifecycle notifications.
//!
//! Units are not simulated by the core. These types are the payloads of the
//! `unit_spawn` and `unit_die` events so that a unit simulation can report
//! through the same dispatcher as everything else.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Kind of unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Harvests and builds.
    Worker,
    /// Scouts the map.
    Explorer,
    /// Fights.
    Warrior,
}

/// Why a unit died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitDeathCause {
    /// Ran out of food.
    Starving,
    /// Killed by a warrior or an explorer.
    Killed,
    /// Removed by the system, e.g. while editing the map.
    System,
}

/// A unit as seen by event subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unit kind.
    pub kind: UnitKind,
    /// Owning player.
    pub owner: PlayerId,
}

impl Unit {
    /// Create a new unit.
    #[must_use]
    pub const fn new(kind: UnitKind, owner: PlayerId) -> Self {
        Self { kind, owner }
    }
}

/// A unit appeared at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitEvent {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// The unit.
    pub unit: Unit,
}

/// A unit died at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDeath {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
    /// The unit that died.
    pub unit: Unit,
    /// The unit responsible, for [`UnitDeathCause::Killed`].
    pub killer: Option<Unit>,
    /// Cause of death.
    pub cause: UnitDeathCause,
}
