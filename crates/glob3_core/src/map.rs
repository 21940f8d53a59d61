//! The game map: a dense terrain grid plus the building registries.
//!
//! Cells are stored in row-major order (`y * size_x + x`). The grid size is
//! fixed at creation; afterwards only the resource part of a cell changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingEntry, BuildingId, BuildingType, Buildings, PlacementResult};
use crate::config::MapConfig;
use crate::error::{GameError, Result};
use crate::player::PlayerId;
use crate::terrain::{ResourceKind, Terrain, TerrainType};

/// A grid coordinate.
pub type Coord = (u32, u32);

/// Terrain grid and everything built on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    size_x: u32,
    size_y: u32,
    cells: Vec<Terrain>,
    buildings: Buildings,
}

impl Map {
    /// A map where every cell is `kind` with no resource.
    ///
    /// # Panics
    ///
    /// Panics if `size_x` or `size_y` is zero.
    #[must_use]
    pub fn blank(size_x: u32, size_y: u32, kind: TerrainType) -> Self {
        assert!(size_x > 0, "Map size_x must be positive");
        assert!(size_y > 0, "Map size_y must be positive");

        let cell_count = (size_x as usize) * (size_y as usize);
        Self {
            size_x,
            size_y,
            cells: vec![Terrain::new(kind); cell_count],
            buildings: Buildings::new(),
        }
    }

    /// The standard starting map with default layout settings.
    ///
    /// # Panics
    ///
    /// Panics if `size_x` or `size_y` is zero.
    #[must_use]
    pub fn create(size_x: u32, size_y: u32) -> Self {
        Self::from_config(&MapConfig {
            size_x,
            size_y,
            ..Default::default()
        })
    }

    /// The standard starting map.
    ///
    /// Grass everywhere, a water square centred on the map, and one seed of
    /// every [`ResourceKind`] along row 0 at `(i, 0)` so growth has
    /// something to spread from. A seed's cell takes the seed's native
    /// terrain. Seeds that do not fit on a narrow map are skipped.
    ///
    /// # Panics
    ///
    /// Panics if either size in `config` is zero.
    #[must_use]
    pub fn from_config(config: &MapConfig) -> Self {
        let mut map = Self::blank(config.size_x, config.size_y, TerrainType::Grass);

        let middle_x = config.size_x / 2;
        let middle_y = config.size_y / 2;
        let half_extent = config.effective_water_half_extent();

        for y in 0..map.size_y {
            for x in 0..map.size_x {
                let distance = x.abs_diff(middle_x).max(y.abs_diff(middle_y));
                if distance <= half_extent {
                    let index = map.index(x, y);
                    map.cells[index] = Terrain::new(TerrainType::Water);
                }
            }
        }

        for (x, kind) in (0..map.size_x).zip(ResourceKind::ALL) {
            let index = map.index(x, 0);
            map.cells[index] =
                Terrain::with_resource(kind.native_terrain(), kind, config.seed_amount);
        }

        tracing::debug!(
            size_x = map.size_x,
            size_y = map.size_y,
            half_extent,
            "Map created"
        );
        map
    }

    /// Map width in cells.
    #[must_use]
    pub const fn size_x(&self) -> u32 {
        self.size_x
    }

    /// Map height in cells.
    #[must_use]
    pub const fn size_y(&self) -> u32 {
        self.size_y
    }

    /// Total number of cells.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.size_x) * u64::from(self.size_y)
    }

    /// Check if coordinates are within map bounds.
    #[must_use]
    pub const fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.size_x && y < self.size_y
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size_x as usize) + (x as usize)
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<usize> {
        if self.in_bounds(x, y) {
            Ok(self.index(x, y))
        } else {
            Err(GameError::OutOfBounds {
                x,
                y,
                size_x: self.size_x,
                size_y: self.size_y,
            })
        }
    }

    /// Terrain at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if `x >= size_x` or `y >= size_y`.
    pub fn get(&self, x: u32, y: u32) -> Result<&Terrain> {
        let index = self.check_bounds(x, y)?;
        Ok(&self.cells[index])
    }

    /// Mutable terrain at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] if `x >= size_x` or `y >= size_y`.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Result<&mut Terrain> {
        let index = self.check_bounds(x, y)?;
        Ok(&mut self.cells[index])
    }

    /// Iterate over `((x, y), cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Terrain)> {
        let size_x = self.size_x;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as u32;
            ((i % size_x, i / size_x), cell)
        })
    }

    /// Verify the resource invariant on every cell.
    ///
    /// Returns the first offending coordinate.
    #[must_use]
    pub fn first_inconsistent_cell(&self) -> Option<Coord> {
        self.cells()
            .find(|(_, cell)| !cell.is_consistent())
            .map(|(coord, _)| coord)
    }

    /// Whether every cell satisfies the resource invariant.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        self.first_inconsistent_cell().is_none()
    }

    // ------------------------------------------------------------------------
    // Buildings
    // ------------------------------------------------------------------------

    /// Place a level 0 building anchored at `(x, y)`.
    ///
    /// The registry does not validate the position; see
    /// [`Map::check_placement`].
    pub fn place_building(
        &mut self,
        owner: PlayerId,
        kind: BuildingType,
        x: u32,
        y: u32,
    ) -> &mut Building {
        self.buildings.place(owner, kind, x, y)
    }

    /// Building whose footprint covers `(x, y)`, if any.
    #[must_use]
    pub fn building_at(&self, x: u32, y: u32) -> Option<&Building> {
        self.buildings.at(x, y)
    }

    /// Mutable building whose footprint covers `(x, y)`, if any.
    pub fn building_at_mut(&mut self, x: u32, y: u32) -> Option<&mut Building> {
        self.buildings.at_mut(x, y)
    }

    /// Remove a building from its registry.
    pub fn remove_building(&mut self, id: BuildingId) -> Option<BuildingEntry> {
        self.buildings.remove(id)
    }

    /// Policy check for a new building of `kind` at `(x, y)`.
    #[must_use]
    pub fn check_placement(&self, kind: BuildingType, x: u32, y: u32) -> PlacementResult {
        self.buildings
            .check_placement(kind, x, y, self.size_x, self.size_y)
    }

    /// All building registries.
    #[must_use]
    pub const fn buildings(&self) -> &Buildings {
        &self.buildings
    }

    /// Mutable building registries.
    pub fn buildings_mut(&mut self) -> &mut Buildings {
        &mut self.buildings
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Calculate a hash of the map state.
    ///
    /// Used for desync detection. Two maps with identical terrain and
    /// registries produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.size_x.hash(&mut hasher);
        self.size_y.hash(&mut hasher);
        self.cells.hash(&mut hasher);

        for entry in self.buildings.entries() {
            entry.x.hash(&mut hasher);
            entry.y.hash(&mut hasher);
            entry.building.id().hash(&mut hasher);
            entry.building.kind().hash(&mut hasher);
            entry.building.owner().hash(&mut hasher);
            entry.building.health.hash(&mut hasher);
            entry.building.level().hash(&mut hasher);
            entry.building.in_progress().hash(&mut hasher);
            entry.building.contents().hash(&mut hasher);
        }

        hasher.finish()
    }

    /// Serialize the map for a save file or network relay.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize map: {}", e)))
    }

    /// Deserialize a map from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the data describes an
    /// inconsistent grid.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut map: Self = bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize map: {}", e)))?;

        let expected = (map.size_x as usize) * (map.size_y as usize);
        if map.size_x == 0 || map.size_y == 0 || map.cells.len() != expected {
            return Err(GameError::InvalidState(format!(
                "Map data has {} cells for a {}x{} grid",
                map.cells.len(),
                map.size_x,
                map.size_y
            )));
        }
        if let Some((x, y)) = map.first_inconsistent_cell() {
            return Err(GameError::InvalidState(format!(
                "Map data has an invalid resource at ({x}, {y})"
            )));
        }
        for entry in map.buildings.entries() {
            let building = &entry.building;
            if crate::buildings::footprint(building.kind(), building.level()).is_none() {
                return Err(GameError::InvalidBuildingLevel {
                    kind: building.kind(),
                    level: building.level(),
                });
            }
        }
        map.buildings.restore_ids()?;
        Ok(map)
    }
}
