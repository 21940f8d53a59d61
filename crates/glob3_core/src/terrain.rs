//! Per-cell terrain and resource state.
//!
//! A [`Terrain`] cell has a fixed [`TerrainType`] and an optional
//! [`ResourceDeposit`]. The deposit amount is always in
//! `1..=MAX_TERRAIN_RESOURCES`, so "no resource" and "amount 0" are the
//! same state and cannot disagree.

use serde::{Deserialize, Serialize};

/// Largest quantity of a resource a single cell can hold.
pub const MAX_TERRAIN_RESOURCES: u8 = 10;

/// Minimum amount a neighbour needs before its resource can spread.
pub const SPREAD_THRESHOLD: u8 = 2;

/// Ground type of a cell. Never changes after map creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainType {
    /// Open land.
    #[default]
    Grass,
    /// Lake or sea.
    Water,
}

impl TerrainType {
    /// All terrain types in declaration order.
    pub const ALL: [Self; 2] = [Self::Grass, Self::Water];
}

/// Kind of resource that can live on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Grows on grass.
    Wheat,
    /// Forest, grows on grass.
    Wood,
    /// Never spreads.
    Stone,
    /// Grows on water.
    Algae,
}

/// Where a resource is allowed to spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Habitat {
    /// Spreads onto [`TerrainType::Grass`] only.
    Grass,
    /// Spreads onto [`TerrainType::Water`] only.
    Water,
    /// Does not spread.
    Inert,
}

impl ResourceKind {
    /// All resource kinds in declaration order.
    pub const ALL: [Self; 4] = [Self::Wheat, Self::Wood, Self::Stone, Self::Algae];

    /// Number of resource kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into per-kind tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Wheat => 0,
            Self::Wood => 1,
            Self::Stone => 2,
            Self::Algae => 3,
        }
    }

    /// Where this resource may spread.
    #[must_use]
    pub const fn habitat(self) -> Habitat {
        match self {
            Self::Wheat | Self::Wood => Habitat::Grass,
            Self::Algae => Habitat::Water,
            Self::Stone => Habitat::Inert,
        }
    }

    /// Whether this resource may spread onto a cell of the given terrain.
    #[must_use]
    pub const fn can_spread_onto(self, terrain: TerrainType) -> bool {
        matches!(
            (self.habitat(), terrain),
            (Habitat::Grass, TerrainType::Grass) | (Habitat::Water, TerrainType::Water)
        )
    }

    /// Terrain a seed of this resource is placed on at map creation.
    #[must_use]
    pub const fn native_terrain(self) -> TerrainType {
        match self.habitat() {
            Habitat::Water => TerrainType::Water,
            Habitat::Grass | Habitat::Inert => TerrainType::Grass,
        }
    }
}

/// A non-empty stack of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceDeposit {
    kind: ResourceKind,
    amount: u8,
}

impl ResourceDeposit {
    /// Create a deposit. Returns `None` when `amount` is 0; larger amounts
    /// are clamped to [`MAX_TERRAIN_RESOURCES`].
    #[must_use]
    pub fn new(kind: ResourceKind, amount: u8) -> Option<Self> {
        (amount > 0).then(|| Self {
            kind,
            amount: amount.min(MAX_TERRAIN_RESOURCES),
        })
    }

    /// Resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Quantity, always in `1..=MAX_TERRAIN_RESOURCES`.
    #[must_use]
    pub const fn amount(&self) -> u8 {
        self.amount
    }

    /// Whether the deposit reached [`MAX_TERRAIN_RESOURCES`].
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.amount >= MAX_TERRAIN_RESOURCES
    }
}

/// State of a single map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Terrain {
    kind: TerrainType,
    resource: Option<ResourceDeposit>,
}

impl Terrain {
    /// An empty cell of the given type.
    #[must_use]
    pub const fn new(kind: TerrainType) -> Self {
        Self {
            kind,
            resource: None,
        }
    }

    /// A cell holding `amount` of `resource` (empty if `amount` is 0).
    #[must_use]
    pub fn with_resource(kind: TerrainType, resource: ResourceKind, amount: u8) -> Self {
        Self {
            kind,
            resource: ResourceDeposit::new(resource, amount),
        }
    }

    /// Ground type.
    #[must_use]
    pub const fn kind(&self) -> TerrainType {
        self.kind
    }

    /// Resource kind on this cell, if any.
    #[must_use]
    pub fn resource(&self) -> Option<ResourceKind> {
        self.resource.map(|deposit| deposit.kind)
    }

    /// Full deposit, if any.
    #[must_use]
    pub const fn deposit(&self) -> Option<ResourceDeposit> {
        self.resource
    }

    /// Resource quantity, 0 when the cell is empty.
    #[must_use]
    pub fn resource_amount(&self) -> u8 {
        self.resource.map_or(0, |deposit| deposit.amount)
    }

    /// Whether the cell holds no resource.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.resource.is_none()
    }

    /// Add one unit to an existing, non-full deposit.
    ///
    /// Returns `true` if the amount changed.
    pub fn grow(&mut self) -> bool {
        match self.resource.as_mut() {
            Some(deposit) if !deposit.is_full() => {
                deposit.amount += 1;
                true
            }
            _ => false,
        }
    }

    /// Start a new deposit of `kind` with amount 1 on an empty cell.
    ///
    /// Returns `false` and leaves the cell untouched if it already holds
    /// a resource.
    pub fn seed(&mut self, kind: ResourceKind) -> bool {
        if self.resource.is_some() {
            return false;
        }
        self.resource = ResourceDeposit::new(kind, 1);
        true
    }

    /// Replace the resource. An amount of 0 clears the cell.
    pub fn set_resource(&mut self, kind: ResourceKind, amount: u8) {
        self.resource = ResourceDeposit::new(kind, amount);
    }

    /// Remove any resource from the cell.
    pub fn clear_resource(&mut self) {
        self.resource = None;
    }

    /// Harvest up to `requested` units.
    ///
    /// Returns the amount actually taken. The cell becomes empty when its
    /// deposit runs out.
    pub fn take_resource(&mut self, requested: u8) -> u8 {
        let Some(deposit) = self.resource.as_mut() else {
            return 0;
        };
        let taken = requested.min(deposit.amount);
        deposit.amount -= taken;
        if deposit.amount == 0 {
            self.resource = None;
        }
        taken
    }

    /// Check the resource invariant for this cell.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match self.resource {
            None => true,
            Some(deposit) => (1..=MAX_TERRAIN_RESOURCES).contains(&deposit.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_zero_is_none() {
        assert!(ResourceDeposit::new(ResourceKind::Wheat, 0).is_none());
    }

    #[test]
    fn test_deposit_clamped() {
        let deposit = ResourceDeposit::new(ResourceKind::Wood, 200).unwrap();
        assert_eq!(deposit.amount(), MAX_TERRAIN_RESOURCES);
        assert!(deposit.is_full());
    }

    #[test]
    fn test_grow_caps_at_max() {
        let mut cell = Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 9);
        assert!(cell.grow());
        assert_eq!(cell.resource_amount(), MAX_TERRAIN_RESOURCES);
        assert!(!cell.grow());
        assert_eq!(cell.resource_amount(), MAX_TERRAIN_RESOURCES);
    }

    #[test]
    fn test_grow_empty_is_noop() {
        let mut cell = Terrain::new(TerrainType::Grass);
        assert!(!cell.grow());
        assert!(cell.is_empty());
    }

    #[test]
    fn test_seed_only_empty() {
        let mut cell = Terrain::new(TerrainType::Water);
        assert!(cell.seed(ResourceKind::Algae));
        assert_eq!(cell.resource(), Some(ResourceKind::Algae));
        assert_eq!(cell.resource_amount(), 1);

        assert!(!cell.seed(ResourceKind::Wheat));
        assert_eq!(cell.resource(), Some(ResourceKind::Algae));
    }

    #[test]
    fn test_take_resource_clears() {
        let mut cell = Terrain::with_resource(TerrainType::Grass, ResourceKind::Stone, 3);
        assert_eq!(cell.take_resource(2), 2);
        assert_eq!(cell.resource_amount(), 1);
        assert_eq!(cell.take_resource(5), 1);
        assert!(cell.is_empty());
        assert_eq!(cell.resource(), None);
        assert_eq!(cell.take_resource(1), 0);
    }

    #[test]
    fn test_set_resource_zero_clears() {
        let mut cell = Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 4);
        cell.set_resource(ResourceKind::Wood, 0);
        assert!(cell.is_empty());
        assert!(cell.is_consistent());
    }

    #[test]
    fn test_habitat_rules() {
        assert!(ResourceKind::Wheat.can_spread_onto(TerrainType::Grass));
        assert!(!ResourceKind::Wheat.can_spread_onto(TerrainType::Water));
        assert!(ResourceKind::Wood.can_spread_onto(TerrainType::Grass));
        assert!(ResourceKind::Algae.can_spread_onto(TerrainType::Water));
        assert!(!ResourceKind::Algae.can_spread_onto(TerrainType::Grass));
        for terrain in TerrainType::ALL {
            assert!(!ResourceKind::Stone.can_spread_onto(terrain));
        }
    }

    #[test]
    fn test_kind_indices_match_all() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
