//! Test fixtures and helpers.
//!
//! Small hand-built maps and a sampler that visits exactly the cells a
//! test asks for.

use std::collections::VecDeque;

use fixed::types::I32F32;
use glob3_core::growth::TileSampler;
use glob3_core::map::{Coord, Map};
use glob3_core::terrain::{ResourceKind, Terrain, TerrainType, MAX_TERRAIN_RESOURCES};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// A `size_x` by `size_y` map of empty grass.
#[must_use]
pub fn all_grass_map(size_x: u32, size_y: u32) -> Map {
    Map::blank(size_x, size_y, TerrainType::Grass)
}

/// A map where every cell holds the same terrain.
#[must_use]
pub fn uniform_map(size_x: u32, size_y: u32, cell: Terrain) -> Map {
    let mut map = Map::blank(size_x, size_y, cell.kind());
    for y in 0..size_y {
        for x in 0..size_x {
            if let Ok(target) = map.get_mut(x, y) {
                *target = cell;
            }
        }
    }
    map
}

/// A grass map where every cell is a full wheat deposit.
#[must_use]
pub fn saturated_map(size_x: u32, size_y: u32) -> Map {
    uniform_map(
        size_x,
        size_y,
        Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, MAX_TERRAIN_RESOURCES),
    )
}

/// Overwrite one cell of `map`.
///
/// # Panics
///
/// Panics if `(x, y)` is outside the map.
pub fn set_cell(map: &mut Map, x: u32, y: u32, cell: Terrain) {
    match map.get_mut(x, y) {
        Ok(target) => *target = cell,
        Err(err) => panic!("fixture cell out of range: {err}"),
    }
}

/// [`TileSampler`] that replays a fixed list of cells.
///
/// Coin flips return a fixed answer. Once the script runs out, sampling
/// panics so a test never silently reads past what it set up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSampler {
    tiles: VecDeque<Coord>,
    coin: bool,
    coin_flips: usize,
}

impl ScriptedSampler {
    /// Replay `tiles` in order.
    #[must_use]
    pub fn new(tiles: &[Coord]) -> Self {
        Self {
            tiles: tiles.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// Answer every [`TileSampler::chance`] call with `coin`.
    #[must_use]
    pub fn with_coin(mut self, coin: bool) -> Self {
        self.coin = coin;
        self
    }

    /// Cells not sampled yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    /// How often a coin was flipped.
    #[must_use]
    pub fn coin_flips(&self) -> usize {
        self.coin_flips
    }
}

impl TileSampler for ScriptedSampler {
    fn sample_tile(&mut self, size_x: u32, size_y: u32) -> (u32, u32) {
        let Some((x, y)) = self.tiles.pop_front() else {
            panic!("scripted sampler ran out of tiles");
        };
        assert!(
            x < size_x && y < size_y,
            "scripted tile ({x}, {y}) outside {size_x}x{size_y} map"
        );
        (x, y)
    }

    fn chance(&mut self, _probability: I32F32) -> bool {
        self.coin_flips += 1;
        self.coin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_map_is_full() {
        let map = saturated_map(3, 2);
        assert!(map
            .cells()
            .all(|(_, cell)| cell.resource_amount() == MAX_TERRAIN_RESOURCES));
    }

    #[test]
    fn test_scripted_sampler_replays_in_order() {
        let mut sampler = ScriptedSampler::new(&[(1, 1), (0, 0)]).with_coin(true);
        assert_eq!(sampler.sample_tile(4, 4), (1, 1));
        assert_eq!(sampler.sample_tile(4, 4), (0, 0));
        assert_eq!(sampler.remaining(), 0);
        assert!(sampler.chance(fixed(0)));
        assert_eq!(sampler.coin_flips(), 1);
    }

    #[test]
    #[should_panic(expected = "ran out of tiles")]
    fn test_scripted_sampler_exhausted() {
        ScriptedSampler::new(&[]).sample_tile(1, 1);
    }
}
