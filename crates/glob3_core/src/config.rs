//! Simulation configuration.
//!
//! Plain data, loadable from RON by the caller. The core performs no IO.
//!
//! # Example RON
//!
//! ```ron
//! CoreConfig(
//!     map: MapConfig(
//!         size_x: 96,
//!         size_y: 64,
//!         water_half_extent: Some(8),
//!         seed_amount: 2,
//!     ),
//!     growth: GrowthConfig(
//!         coefficient: 4294967,
//!     ),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, ratio, Fixed};
use crate::terrain::MAX_TERRAIN_RESOURCES;

/// Default map edge length in cells.
pub const DEFAULT_MAP_SIZE: u32 = 128;

/// Divisor applied to the shorter map edge to size the central lake.
pub const WATER_EXTENT_DIVISOR: u32 = 6;

/// Map layout for [`crate::map::Map::from_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in cells.
    pub size_x: u32,
    /// Map height in cells.
    pub size_y: u32,
    /// Chebyshev radius of the central water square. `None` derives it
    /// from the map size.
    pub water_half_extent: Option<u32>,
    /// Amount placed on each bootstrap resource seed.
    pub seed_amount: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size_x: DEFAULT_MAP_SIZE,
            size_y: DEFAULT_MAP_SIZE,
            water_half_extent: None,
            seed_amount: 2,
        }
    }
}

impl MapConfig {
    /// A square map of the given edge length.
    #[must_use]
    pub fn square(size: u32) -> Self {
        Self {
            size_x: size,
            size_y: size,
            ..Default::default()
        }
    }

    /// Create a small map (64x64 cells).
    #[must_use]
    pub fn small() -> Self {
        Self::square(64)
    }

    /// Create a medium map (96x96 cells).
    #[must_use]
    pub fn medium() -> Self {
        Self::square(96)
    }

    /// Create a large map (128x128 cells).
    #[must_use]
    pub fn large() -> Self {
        Self::square(128)
    }

    /// Radius of the central lake actually used.
    #[must_use]
    pub fn effective_water_half_extent(&self) -> u32 {
        self.water_half_extent
            .unwrap_or(self.size_x.min(self.size_y) / WATER_EXTENT_DIVISOR)
    }
}

/// Resource growth tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Tiles sampled per tick, as a fraction of the map area.
    #[serde(with = "fixed_serde")]
    pub coefficient: Fixed,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self::per_thousand(1)
    }
}

impl GrowthConfig {
    /// Sample `samples` tiles for every thousand tiles of map area.
    #[must_use]
    pub fn per_thousand(samples: i32) -> Self {
        Self {
            coefficient: ratio(samples, 1000),
        }
    }
}

/// Everything the core needs to set up a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Map layout.
    pub map: MapConfig,
    /// Growth tuning.
    pub growth: GrowthConfig,
}

impl CoreConfig {
    /// Check the configuration for values the core cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.map.size_x == 0 || self.map.size_y == 0 {
            return Err(GameError::InvalidConfig(format!(
                "map size must be positive, got {}x{}",
                self.map.size_x, self.map.size_y
            )));
        }
        if !(1..=MAX_TERRAIN_RESOURCES).contains(&self.map.seed_amount) {
            return Err(GameError::InvalidConfig(format!(
                "seed_amount must be in 1..={MAX_TERRAIN_RESOURCES}, got {}",
                self.map.seed_amount
            )));
        }
        if self.growth.coefficient < Fixed::ZERO {
            return Err(GameError::InvalidConfig(format!(
                "growth coefficient must not be negative, got {}",
                self.growth.coefficient
            )));
        }
        Ok(())
    }
}
