//! Resource growth behaviour against hand-built and generated maps.

use glob3_core::config::GrowthConfig;
use glob3_core::growth::{grow, RandomSampler};
use glob3_core::math::Fixed;
use glob3_core::terrain::{ResourceKind, Terrain, TerrainType, MAX_TERRAIN_RESOURCES};
use glob3_test_utils::fixtures::{all_grass_map, saturated_map, set_cell, ScriptedSampler};
use glob3_test_utils::proptest::prelude::*;
use glob3_test_utils::strategies::arb_map;

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_wheat_grows_then_spreads_to_corner() {
    let mut map = all_grass_map(4, 4);
    set_cell(
        &mut map,
        1,
        1,
        Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 2),
    );

    // 16 cells * 0.125 = exactly two samples.
    let config = GrowthConfig::per_thousand(125);
    let mut sampler = ScriptedSampler::new(&[(1, 1), (0, 0)]);
    let changes = grow(&mut map, &config, &mut sampler);

    assert_eq!(changes.as_slice(), &[(1, 1), (0, 0)]);
    assert_eq!(sampler.remaining(), 0);
    assert_eq!(map.get(1, 1).unwrap().resource_amount(), 3);
    assert_eq!(map.get(0, 0).unwrap().resource(), Some(ResourceKind::Wheat));
    assert_eq!(map.get(0, 0).unwrap().resource_amount(), 1);
}

#[test]
fn test_saturated_map_yields_no_changes() {
    let mut map = saturated_map(8, 8);
    let before = map.state_hash();
    // 64 * 0.5 = 32 samples, all on full cells.
    let config = GrowthConfig::per_thousand(500);

    let changes = grow(&mut map, &config, &mut RandomSampler::seeded(3));

    assert!(changes.is_empty());
    assert_eq!(map.state_hash(), before);
}

#[test]
fn test_small_map_forces_a_sample_on_coin() {
    let mut map = all_grass_map(2, 2);
    set_cell(
        &mut map,
        0,
        0,
        Terrain::with_resource(TerrainType::Grass, ResourceKind::Wood, 4),
    );
    let config = GrowthConfig::default();

    let mut heads = ScriptedSampler::new(&[(0, 0)]).with_coin(true);
    let changes = grow(&mut map, &config, &mut heads);
    assert_eq!(changes.as_slice(), &[(0, 0)]);
    assert_eq!(heads.coin_flips(), 1);

    let mut tails = ScriptedSampler::new(&[]).with_coin(false);
    assert!(grow(&mut map, &config, &mut tails).is_empty());
    assert_eq!(map.get(0, 0).unwrap().resource_amount(), 5);
}

#[test]
fn test_growth_caps_at_max() {
    let mut map = all_grass_map(1, 1);
    set_cell(
        &mut map,
        0,
        0,
        Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 1),
    );
    let config = GrowthConfig {
        coefficient: Fixed::from_num(1),
    };
    let mut sampler = RandomSampler::seeded(0);

    for _ in 0..(MAX_TERRAIN_RESOURCES as usize * 2) {
        grow(&mut map, &config, &mut sampler);
    }
    assert_eq!(map.get(0, 0).unwrap().resource_amount(), MAX_TERRAIN_RESOURCES);
}

#[test]
fn test_algae_spreads_only_through_water() {
    let mut map = all_grass_map(3, 1);
    set_cell(
        &mut map,
        0,
        0,
        Terrain::with_resource(TerrainType::Water, ResourceKind::Algae, 3),
    );
    set_cell(&mut map, 2, 0, Terrain::new(TerrainType::Water));

    // (1, 0) is grass: algae may not settle there, so (2, 0) is cut off.
    let config = GrowthConfig {
        coefficient: Fixed::from_num(1),
    };
    let mut sampler = RandomSampler::seeded(11);
    for _ in 0..50 {
        grow(&mut map, &config, &mut sampler);
    }
    assert!(map.get(1, 0).unwrap().is_empty());
    assert!(map.get(2, 0).unwrap().is_empty());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// The cell invariant survives any number of passes on any map.
    #[test]
    fn prop_growth_preserves_cell_invariant(
        map in arb_map(12),
        seed in any::<u64>(),
        passes in 1usize..20,
    ) {
        let mut map = map;
        let config = GrowthConfig::per_thousand(300);
        let mut sampler = RandomSampler::seeded(seed);
        for _ in 0..passes {
            grow(&mut map, &config, &mut sampler);
            prop_assert!(map.check_invariants());
        }
    }

    /// Growth never changes terrain types and never touches buildings.
    #[test]
    fn prop_growth_only_touches_resources(map in arb_map(10), seed in any::<u64>()) {
        let mut grown = map.clone();
        grow(&mut grown, &GrowthConfig::per_thousand(500), &mut RandomSampler::seeded(seed));

        for ((coord, before), (_, after)) in map.cells().zip(grown.cells()) {
            prop_assert_eq!(before.kind(), after.kind(), "terrain changed at {:?}", coord);
        }
        prop_assert_eq!(map.buildings(), grown.buildings());
    }

    /// Every reported coordinate is on the map and actually differs or grew.
    #[test]
    fn prop_changes_are_in_bounds(map in arb_map(10), seed in any::<u64>()) {
        let mut map = map;
        let changes = grow(&mut map, &GrowthConfig::per_thousand(500), &mut RandomSampler::seeded(seed));
        for &(x, y) in &changes {
            prop_assert!(map.in_bounds(x, y));
            prop_assert!(!map.get(x, y).unwrap().is_empty());
        }
    }

    /// A fully saturated map reports nothing, whatever the sampler does.
    #[test]
    fn prop_saturated_maps_are_idle(
        size_x in 1u32..16,
        size_y in 1u32..16,
        seed in any::<u64>(),
    ) {
        let mut map = saturated_map(size_x, size_y);
        let changes = grow(&mut map, &GrowthConfig::per_thousand(900), &mut RandomSampler::seeded(seed));
        prop_assert!(changes.is_empty());
    }
}
