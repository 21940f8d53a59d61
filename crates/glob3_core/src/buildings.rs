//! Building catalog and footprint lookup.
//!
//! Buildings live in one registry per [`BuildingType`]. Each registry entry
//! anchors a building at the top-left corner of its footprint. Footprint
//! sizes and base health come from a static `(type, level)` table rather
//! than from instance state.
//!
//! The registry never rejects a placement. Overlap and bounds checks are
//! offered through [`Buildings::check_placement`] for callers that enforce a
//! placement policy.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::PlayerId;
use crate::terrain::ResourceKind;

// ============================================================================
// Static building table
// ============================================================================

/// Number of levels in the building table.
pub const MAX_BUILDING_LEVEL: u8 = 3;

/// Building health points.
pub type BuildingHealth = u16;

/// Kind of building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingType {
    /// Feeds units.
    Inn,
    /// Spawns units.
    Swarm,
}

impl BuildingType {
    /// All building types, in registry scan order.
    pub const ALL: [Self; 2] = [Self::Inn, Self::Swarm];

    /// Number of building types.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into per-type tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Inn => 0,
            Self::Swarm => 1,
        }
    }
}

/// Defines the size of a building in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingFootprint {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl BuildingFootprint {
    /// Create a new building footprint.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Create a square footprint.
    #[must_use]
    pub const fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Get the total number of cells this footprint covers.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.width * self.height
    }

    /// Whether `(x, y)` lies in this footprint anchored at `(anchor_x, anchor_y)`.
    #[must_use]
    pub const fn covers(&self, anchor_x: u32, anchor_y: u32, x: u32, y: u32) -> bool {
        // u64 so that anchors near u32::MAX cannot wrap.
        let (ax, ay, x, y) = (anchor_x as u64, anchor_y as u64, x as u64, y as u64);
        x >= ax && x < ax + self.width as u64 && y >= ay && y < ay + self.height as u64
    }

    /// Whether two anchored footprints share at least one cell.
    #[must_use]
    pub const fn intersects(&self, at: (u32, u32), other: &Self, other_at: (u32, u32)) -> bool {
        let (ax, ay) = (at.0 as u64, at.1 as u64);
        let (bx, by) = (other_at.0 as u64, other_at.1 as u64);
        ax < bx + other.width as u64
            && bx < ax + self.width as u64
            && ay < by + other.height as u64
            && by < ay + self.height as u64
    }
}

const BUILDING_SIZE: [[BuildingFootprint; MAX_BUILDING_LEVEL as usize]; BuildingType::COUNT] = [
    // Inn
    [
        BuildingFootprint::square(2),
        BuildingFootprint::square(2),
        BuildingFootprint::square(3),
    ],
    // Swarm
    [
        BuildingFootprint::square(3),
        BuildingFootprint::square(0),
        BuildingFootprint::square(0),
    ],
];

const BUILDING_HEALTH: [[BuildingHealth; MAX_BUILDING_LEVEL as usize]; BuildingType::COUNT] = [
    [200, 500, 700], // Inn
    [700, 0, 0],     // Swarm
];

/// Footprint of `kind` at `level`.
///
/// Returns `None` when the table has no such level. A 0x0 entry marks a
/// level that type cannot reach.
#[must_use]
pub fn footprint(kind: BuildingType, level: u8) -> Option<BuildingFootprint> {
    BUILDING_SIZE[kind.index()]
        .get(level as usize)
        .copied()
        .filter(|size| size.cell_count() > 0)
}

/// Base health of `kind` at `level`, or `None` if the level is unavailable.
#[must_use]
pub fn base_health(kind: BuildingType, level: u8) -> Option<BuildingHealth> {
    footprint(kind, level)?;
    BUILDING_HEALTH[kind.index()].get(level as usize).copied()
}

/// Health a freshly placed building of `kind` starts with.
///
/// This is the raw level 1 column of the health table, even though the
/// building itself starts at level 0. Types without a level 1 (Swarm) start
/// at 0.
#[must_use]
pub const fn initial_health(kind: BuildingType) -> BuildingHealth {
    BUILDING_HEALTH[kind.index()][1]
}

// ============================================================================
// Building instances
// ============================================================================

/// Unique identifier for a placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Per-resource stock held by a building, including construction material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Inventory([u32; ResourceKind::COUNT]);

impl Inventory {
    /// Quantity of `kind` in stock.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        self.0[kind.index()]
    }

    /// Add `amount` of `kind`, saturating.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        let slot = &mut self.0[kind.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Remove up to `amount` of `kind`, returning what was removed.
    pub fn remove(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let slot = &mut self.0[kind.index()];
        let removed = amount.min(*slot);
        *slot -= removed;
        removed
    }

    /// Sum over all kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&n| u64::from(n)).sum()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&n| n == 0)
    }
}

/// A placed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    id: BuildingId,
    kind: BuildingType,
    owner: PlayerId,
    /// Current health points.
    pub health: BuildingHealth,
    level: u8,
    contents: Inventory,
    in_progress: bool,
}

impl Building {
    /// A fresh level 0 building under construction.
    fn new(id: BuildingId, owner: PlayerId, kind: BuildingType) -> Self {
        Self {
            id,
            kind,
            owner,
            health: initial_health(kind),
            level: 0,
            contents: Inventory::default(),
            in_progress: true,
        }
    }

    /// Registry-assigned identifier.
    #[must_use]
    pub const fn id(&self) -> BuildingId {
        self.id
    }

    /// Building type.
    #[must_use]
    pub const fn kind(&self) -> BuildingType {
        self.kind
    }

    /// Owning player. Non-owning key.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Current level, always in `0..MAX_BUILDING_LEVEL`.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Whether the building is still under construction.
    #[must_use]
    pub const fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Stored resources.
    #[must_use]
    pub const fn contents(&self) -> &Inventory {
        &self.contents
    }

    /// Footprint for the current `(type, level)`.
    #[must_use]
    pub const fn footprint(&self) -> BuildingFootprint {
        // `level` only ever holds levels with a non-empty table entry.
        BUILDING_SIZE[self.kind.index()][self.level as usize]
    }

    /// Width in cells, from the static table.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.footprint().width
    }

    /// Height in cells, from the static table.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.footprint().height
    }

    /// Store resources in the building.
    pub fn store(&mut self, kind: ResourceKind, amount: u32) {
        self.contents.add(kind, amount);
    }

    /// Take resources out of the building.
    pub fn withdraw(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        self.contents.remove(kind, amount)
    }

    /// Finish construction.
    pub fn complete(&mut self) {
        self.in_progress = false;
    }

    /// Start building the next level.
    ///
    /// Health resets to the new level's baseline and the building goes back
    /// under construction.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidBuildingLevel`] if this type has no next
    /// level. The building is left unchanged.
    pub fn upgrade(&mut self) -> Result<()> {
        let next = self.level + 1;
        let health = base_health(self.kind, next).ok_or(GameError::InvalidBuildingLevel {
            kind: self.kind,
            level: next,
        })?;
        self.level = next;
        self.health = health;
        self.in_progress = true;
        Ok(())
    }
}

// ============================================================================
// Registries
// ============================================================================

/// A building anchored at the top-left corner of its footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingEntry {
    /// Anchor column.
    pub x: u32,
    /// Anchor row.
    pub y: u32,
    /// The building itself.
    pub building: Building,
}

impl BuildingEntry {
    /// Whether `(x, y)` lies inside this entry's footprint.
    #[must_use]
    pub const fn covers(&self, x: u32, y: u32) -> bool {
        self.building.footprint().covers(self.x, self.y, x, y)
    }
}

/// Outcome of a placement policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementResult {
    /// Placement is valid.
    Valid,
    /// Footprint would leave the map.
    OutOfBounds,
    /// Footprint would overlap an existing building.
    Overlaps(BuildingId),
}

impl PlacementResult {
    /// Check if placement is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, PlacementResult::Valid)
    }
}

/// Every building on a map, one ordered registry per type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildings {
    registries: [Vec<BuildingEntry>; BuildingType::COUNT],
    next_id: u32,
}

impl Default for Buildings {
    fn default() -> Self {
        Self::new()
    }
}

impl Buildings {
    /// Empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registries: std::array::from_fn(|_| Vec::new()),
            next_id: 1,
        }
    }

    /// Place a new level 0 building anchored at `(x, y)`.
    ///
    /// Never rejects on position.
    pub fn place(&mut self, owner: PlayerId, kind: BuildingType, x: u32, y: u32) -> &mut Building {
        let id = BuildingId(self.next_id);
        self.next_id += 1;
        tracing::debug!(id = id.0, ?kind, x, y, owner = owner.0, "Building placed");

        let registry = &mut self.registries[kind.index()];
        registry.push(BuildingEntry {
            x,
            y,
            building: Building::new(id, owner, kind),
        });
        let last = registry.len() - 1;
        &mut registry[last].building
    }

    /// The entry whose footprint covers `(x, y)`.
    ///
    /// Scans registries in [`BuildingType::ALL`] order, then insertion order;
    /// the first match wins.
    #[must_use]
    pub fn entry_at(&self, x: u32, y: u32) -> Option<&BuildingEntry> {
        self.entries().find(|entry| entry.covers(x, y))
    }

    /// The building covering `(x, y)`.
    #[must_use]
    pub fn at(&self, x: u32, y: u32) -> Option<&Building> {
        self.entry_at(x, y).map(|entry| &entry.building)
    }

    /// Mutable access to the building covering `(x, y)`.
    pub fn at_mut(&mut self, x: u32, y: u32) -> Option<&mut Building> {
        self.registries
            .iter_mut()
            .flat_map(|registry| registry.iter_mut())
            .find(|entry| entry.covers(x, y))
            .map(|entry| &mut entry.building)
    }

    /// Look up a building by id.
    #[must_use]
    pub fn get(&self, id: BuildingId) -> Option<&BuildingEntry> {
        self.entries().find(|entry| entry.building.id == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.registries
            .iter_mut()
            .flat_map(|registry| registry.iter_mut())
            .find(|entry| entry.building.id == id)
            .map(|entry| &mut entry.building)
    }

    /// Remove a building, handing it back to the caller.
    pub fn remove(&mut self, id: BuildingId) -> Option<BuildingEntry> {
        for registry in &mut self.registries {
            if let Some(index) = registry.iter().position(|entry| entry.building.id == id) {
                return Some(registry.remove(index));
            }
        }
        None
    }

    /// Check the ids of a restored registry and move the id counter past
    /// the highest one.
    pub(crate) fn restore_ids(&mut self) -> Result<()> {
        let mut ids: Vec<u32> = self.entries().map(|entry| entry.building.id.0).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GameError::InvalidState(format!(
                "Duplicate building id {}",
                pair[0]
            )));
        }
        if let Some(&highest) = ids.last() {
            self.next_id = self.next_id.max(highest.saturating_add(1));
        }
        Ok(())
    }

    /// Entries of one type in insertion order.
    #[must_use]
    pub fn of_type(&self, kind: BuildingType) -> &[BuildingEntry] {
        &self.registries[kind.index()]
    }

    /// All entries in scan order.
    pub fn entries(&self) -> impl Iterator<Item = &BuildingEntry> {
        self.registries.iter().flat_map(|registry| registry.iter())
    }

    /// Total number of buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.iter().map(Vec::len).sum()
    }

    /// Whether no building is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.iter().all(Vec::is_empty)
    }

    /// Check whether a new level 0 `kind` at `(x, y)` would fit on a
    /// `size_x` x `size_y` map without overlapping anything.
    #[must_use]
    pub fn check_placement(
        &self,
        kind: BuildingType,
        x: u32,
        y: u32,
        size_x: u32,
        size_y: u32,
    ) -> PlacementResult {
        let size = BUILDING_SIZE[kind.index()][0];
        let fits_x = u64::from(x) + u64::from(size.width) <= u64::from(size_x);
        let fits_y = u64::from(y) + u64::from(size.height) <= u64::from(size_y);
        if !fits_x || !fits_y {
            return PlacementResult::OutOfBounds;
        }

        self.entries()
            .find(|entry| {
                size.intersects((x, y), &entry.building.footprint(), (entry.x, entry.y))
            })
            .map_or(PlacementResult::Valid, |entry| {
                PlacementResult::Overlaps(entry.building.id)
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
