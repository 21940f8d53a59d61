//! Resource growth: existing deposits thicken and full-enough deposits
//! spread to empty neighbours.
//!
//! Each pass samples `floor(area * coefficient)` random cells. A sampled
//! cell with a non-full deposit grows by one. A sampled empty cell copies
//! the resource of its first eligible Moore neighbour (amount at least
//! [`SPREAD_THRESHOLD`], compatible habitat) at amount 1. Everything else is
//! left alone. The pass returns the cells it changed, in sampling order.
//!
//! Randomness comes from an injected [`TileSampler`] so tests can script
//! exactly which cells are visited.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::config::GrowthConfig;
use crate::events::{ChangeSet, Subscriber};
use crate::game::World;
use crate::map::Map;
use crate::math::{scale, Fixed};
use crate::player::PlayerInfo;
use crate::terrain::{ResourceKind, SPREAD_THRESHOLD};

/// Source of randomness for a growth pass.
pub trait TileSampler {
    /// Pick a cell uniformly from a `size_x` by `size_y` grid.
    fn sample_tile(&mut self, size_x: u32, size_y: u32) -> (u32, u32);

    /// Return `true` with the given probability (clamped to `0..=1`).
    fn chance(&mut self, probability: Fixed) -> bool;
}

/// [`TileSampler`] backed by a [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RandomSampler<R = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> RandomSampler<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// The wrapped generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RandomSampler<ChaCha8Rng> {
    /// Deterministic sampler for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Sampler seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> TileSampler for RandomSampler<R> {
    fn sample_tile(&mut self, size_x: u32, size_y: u32) -> (u32, u32) {
        (self.rng.gen_range(0..size_x), self.rng.gen_range(0..size_y))
    }

    fn chance(&mut self, probability: Fixed) -> bool {
        if probability <= Fixed::ZERO {
            return false;
        }
        if probability >= Fixed::ONE {
            return true;
        }
        let roll = Fixed::from_bits(self.rng.gen_range(0..Fixed::ONE.to_bits()));
        roll < probability
    }
}

/// Number of cells to sample this pass.
///
/// Fractional budgets below one still get an occasional sample so that
/// growth never stalls on small maps.
pub fn sample_budget(area: u64, config: &GrowthConfig, sampler: &mut impl TileSampler) -> u64 {
    let amount = scale(area, config.coefficient);
    if amount < Fixed::ONE {
        u64::from(sampler.chance(amount))
    } else {
        amount.to_num::<u64>()
    }
}

/// Run one growth pass over `map`.
///
/// Never fails. Only terrain resources change; buildings are untouched.
pub fn grow(map: &mut Map, config: &GrowthConfig, sampler: &mut impl TileSampler) -> ChangeSet {
    let samples = sample_budget(map.area(), config, sampler);
    let mut changes = ChangeSet::new();

    for _ in 0..samples {
        let (x, y) = sampler.sample_tile(map.size_x(), map.size_y());
        if grow_cell(map, x, y) {
            changes.push(x, y);
        }
    }

    #[cfg(feature = "debug-validation")]
    if let Some((x, y)) = map.first_inconsistent_cell() {
        tracing::error!(x, y, "terrain invariant broken after growth");
        panic!("terrain invariant broken at ({x}, {y})");
    }

    trace!(samples, changed = changes.len(), "growth pass");
    changes
}

/// Grow or seed a single cell. Returns `true` if it changed.
fn grow_cell(map: &mut Map, x: u32, y: u32) -> bool {
    let Ok(cell) = map.get(x, y) else {
        return false;
    };

    if !cell.is_empty() {
        return map.get_mut(x, y).is_ok_and(|cell| cell.grow());
    }

    let terrain = cell.kind();
    match spreading_neighbour(map, x, y, |kind| kind.can_spread_onto(terrain)) {
        Some(kind) => map.get_mut(x, y).is_ok_and(|cell| cell.seed(kind)),
        None => false,
    }
}

/// First resource in the Moore neighbourhood of `(x, y)` that is dense enough
/// to spread and accepted by `compatible`.
///
/// Scans increasing x, then increasing y, clamped at the map edges.
fn spreading_neighbour(
    map: &Map,
    x: u32,
    y: u32,
    compatible: impl Fn(ResourceKind) -> bool,
) -> Option<ResourceKind> {
    let x_range = x.saturating_sub(1)..=(x + 1).min(map.size_x() - 1);
    let y_range = y.saturating_sub(1)..=(y + 1).min(map.size_y() - 1);

    for nx in x_range {
        for ny in y_range.clone() {
            if (nx, ny) == (x, y) {
                continue;
            }
            let Ok(neighbour) = map.get(nx, ny) else {
                continue;
            };
            let Some(deposit) = neighbour.deposit() else {
                continue;
            };
            if deposit.amount() >= SPREAD_THRESHOLD && compatible(deposit.kind()) {
                return Some(deposit.kind());
            }
        }
    }
    None
}

/// Subscriber that runs a growth pass every tick and reports the result.
///
/// Register it on a single player's `game_tick` list; it runs once per
/// firing.
#[derive(Debug)]
pub struct ResourceGrowth<S = RandomSampler> {
    config: GrowthConfig,
    sampler: S,
    passes: u64,
    total_changes: u64,
}

impl<S: TileSampler> ResourceGrowth<S> {
    /// Growth driven by `sampler`.
    pub const fn new(config: GrowthConfig, sampler: S) -> Self {
        Self {
            config,
            sampler,
            passes: 0,
            total_changes: 0,
        }
    }

    /// Passes run so far.
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Cells changed over all passes, duplicates included.
    pub const fn total_changes(&self) -> u64 {
        self.total_changes
    }
}

impl<S: TileSampler> Subscriber for ResourceGrowth<S> {
    fn on_game_tick(&mut self, world: &mut World, _player: &PlayerInfo) {
        let changes = grow(world.map_mut(), &self.config, &mut self.sampler);
        self.passes += 1;
        self.total_changes += changes.len() as u64;
        if !changes.is_empty() {
            debug!(tick = world.tick(), changed = changes.len(), "resources grew");
        }
        world.report_map_changes(changes);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::terrain::{Terrain, TerrainType, MAX_TERRAIN_RESOURCES};

    /// Replays a fixed list of cells and a fixed coin.
    struct Script {
        tiles: VecDeque<(u32, u32)>,
        coin: bool,
    }

    impl Script {
        fn new(tiles: &[(u32, u32)]) -> Self {
            Self {
                tiles: tiles.iter().copied().collect(),
                coin: false,
            }
        }
    }

    impl TileSampler for Script {
        fn sample_tile(&mut self, _size_x: u32, _size_y: u32) -> (u32, u32) {
            self.tiles.pop_front().unwrap()
        }

        fn chance(&mut self, _probability: Fixed) -> bool {
            self.coin
        }
    }

    fn grass(size: u32) -> Map {
        Map::blank(size, size, TerrainType::Grass)
    }

    /// Coefficient that floors to exactly `samples` on a `size` square map.
    fn budget(samples: u32, size: u32) -> GrowthConfig {
        GrowthConfig {
            coefficient: Fixed::from_num(samples) / Fixed::from_num(size * size) + Fixed::DELTA,
        }
    }

    fn put(map: &mut Map, x: u32, y: u32, terrain: Terrain) {
        *map.get_mut(x, y).unwrap() = terrain;
    }

    // ------------------------------------------------------------------------
    // Sample budget
    // ------------------------------------------------------------------------

    #[test]
    fn test_budget_floors() {
        let mut script = Script::new(&[]);
        let config = GrowthConfig::per_thousand(125);
        assert_eq!(sample_budget(16, &config, &mut script), 2);
        assert_eq!(sample_budget(15, &config, &mut script), 1);
    }

    #[test]
    fn test_fractional_budget_uses_coin() {
        let config = GrowthConfig::default();
        let mut script = Script::new(&[]);
        assert_eq!(sample_budget(16, &config, &mut script), 0);
        script.coin = true;
        assert_eq!(sample_budget(16, &config, &mut script), 1);
    }

    #[test]
    fn test_zero_coefficient_never_samples() {
        let config = GrowthConfig {
            coefficient: Fixed::ZERO,
        };
        let mut sampler = RandomSampler::seeded(1);
        for _ in 0..100 {
            assert_eq!(sample_budget(10_000, &config, &mut sampler), 0);
        }
    }

    // ------------------------------------------------------------------------
    // Growing and spreading
    // ------------------------------------------------------------------------

    #[test]
    fn test_grow_then_spread() {
        let mut map = grass(4);
        put(&mut map, 1, 1, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 2));

        let mut script = Script::new(&[(1, 1), (0, 0)]);
        let changes = grow(&mut map, &budget(2, 4), &mut script);

        assert_eq!(changes.as_slice(), &[(1, 1), (0, 0)]);
        assert_eq!(map.get(1, 1).unwrap().resource_amount(), 3);
        let seeded = map.get(0, 0).unwrap();
        assert_eq!(seeded.resource(), Some(ResourceKind::Wheat));
        assert_eq!(seeded.resource_amount(), 1);
    }

    #[test]
    fn test_thin_neighbour_does_not_spread() {
        let mut map = grass(3);
        put(&mut map, 1, 1, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wood, 1));

        let changes = grow(&mut map, &budget(1, 3), &mut Script::new(&[(0, 0)]));
        assert!(changes.is_empty());
        assert!(map.get(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_stone_never_spreads() {
        let mut map = grass(3);
        put(&mut map, 1, 1, Terrain::with_resource(TerrainType::Grass, ResourceKind::Stone, 9));

        let changes = grow(&mut map, &budget(1, 3), &mut Script::new(&[(0, 0)]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_habitat_respected() {
        let mut map = grass(3);
        put(&mut map, 1, 1, Terrain::with_resource(TerrainType::Water, ResourceKind::Algae, 5));
        put(&mut map, 2, 2, Terrain::new(TerrainType::Water));

        let changes = grow(&mut map, &budget(2, 3), &mut Script::new(&[(0, 0), (2, 2)]));
        assert_eq!(changes.as_slice(), &[(2, 2)]);
        assert!(map.get(0, 0).unwrap().is_empty());
        assert_eq!(map.get(2, 2).unwrap().resource(), Some(ResourceKind::Algae));
    }

    #[test]
    fn test_scan_order_prefers_lower_x_then_lower_y() {
        let mut map = grass(3);
        put(&mut map, 0, 2, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wood, 2));
        put(&mut map, 1, 0, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 2));

        grow(&mut map, &budget(1, 3), &mut Script::new(&[(1, 1)]));
        assert_eq!(map.get(1, 1).unwrap().resource(), Some(ResourceKind::Wood));
    }

    #[test]
    fn test_first_eligible_neighbour_wins() {
        let mut map = grass(3);
        put(&mut map, 0, 0, Terrain::with_resource(TerrainType::Grass, ResourceKind::Stone, 5));
        put(&mut map, 0, 1, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 1));
        put(&mut map, 2, 2, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wood, 3));

        grow(&mut map, &budget(1, 3), &mut Script::new(&[(1, 1)]));
        assert_eq!(map.get(1, 1).unwrap().resource(), Some(ResourceKind::Wood));
    }

    #[test]
    fn test_full_cell_unchanged() {
        let mut map = grass(2);
        put(
            &mut map,
            0,
            0,
            Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, MAX_TERRAIN_RESOURCES),
        );

        let changes = grow(&mut map, &budget(1, 2), &mut Script::new(&[(0, 0)]));
        assert!(changes.is_empty());
        assert_eq!(map.get(0, 0).unwrap().resource_amount(), MAX_TERRAIN_RESOURCES);
    }

    #[test]
    fn test_duplicates_recorded() {
        let mut map = grass(2);
        put(&mut map, 1, 1, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 2));

        let changes = grow(&mut map, &budget(3, 2), &mut Script::new(&[(1, 1), (1, 1), (1, 1)]));
        assert_eq!(changes.as_slice(), &[(1, 1), (1, 1), (1, 1)]);
        assert_eq!(map.get(1, 1).unwrap().resource_amount(), 5);
    }

    #[test]
    fn test_edge_cell_neighbourhood_clamped() {
        let mut map = grass(1);
        let changes = grow(&mut map, &budget(1, 1), &mut Script::new(&[(0, 0)]));
        assert!(changes.is_empty());
    }

    // ------------------------------------------------------------------------
    // Seeded sampler
    // ------------------------------------------------------------------------

    #[test]
    fn test_random_sampler_in_bounds() {
        let mut sampler = RandomSampler::seeded(7);
        for _ in 0..1000 {
            let (x, y) = sampler.sample_tile(5, 3);
            assert!(x < 5 && y < 3);
        }
    }

    #[test]
    fn test_random_sampler_chance_extremes() {
        let mut sampler = RandomSampler::seeded(7);
        for _ in 0..100 {
            assert!(!sampler.chance(Fixed::ZERO));
            assert!(sampler.chance(Fixed::ONE));
        }
    }

    #[test]
    fn test_seeded_growth_is_deterministic() {
        let run = |seed| {
            let mut map = Map::create(32, 32);
            let mut sampler = RandomSampler::seeded(seed);
            let config = GrowthConfig::per_thousand(200);
            let mut all = Vec::new();
            for _ in 0..50 {
                all.push(grow(&mut map, &config, &mut sampler));
            }
            (all, map.state_hash())
        };
        assert_eq!(run(42), run(42));
    }
}
