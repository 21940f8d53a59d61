//! Error types for the game simulation.

use thiserror::Error;

use crate::buildings::BuildingType;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// A coordinate query fell outside the map.
    #[error("Coordinate ({x}, {y}) is outside the {size_x}x{size_y} map")]
    OutOfBounds {
        /// Queried column.
        x: u32,
        /// Queried row.
        y: u32,
        /// Map width.
        size_x: u32,
        /// Map height.
        size_y: u32,
    },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The static building table has no entry for this level.
    #[error("{kind:?} has no level {level}")]
    InvalidBuildingLevel {
        /// Building type.
        kind: BuildingType,
        /// Requested level.
        level: u8,
    },

    /// Subscriber handle not registered with this player.
    #[error("Unknown subscriber: {0}")]
    UnknownSubscriber(u32),

    /// Player not registered with this game.
    #[error("Unknown player: {0}")]
    UnknownPlayer(u32),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
