//! Building placement and footprint lookup on real maps.

use glob3_core::buildings::{
    base_health, footprint, initial_health, BuildingType, PlacementResult,
};
use glob3_core::map::Map;
use glob3_core::player::PlayerId;
use glob3_test_utils::fixtures::all_grass_map;
use glob3_test_utils::proptest::prelude::*;
use glob3_test_utils::strategies::{arb_building_type, arb_coord};

const OWNER: PlayerId = PlayerId(1);

#[test]
fn test_inn_placed_at_level_zero() {
    let mut map = all_grass_map(16, 16);
    let inn = map.place_building(OWNER, BuildingType::Inn, 3, 4);

    assert_eq!(inn.level(), 0);
    assert!(inn.in_progress());
    assert!(inn.contents().is_empty());
    assert_eq!(inn.owner(), OWNER);

    let expected = footprint(BuildingType::Inn, 0).unwrap();
    assert_eq!((inn.width(), inn.height()), (expected.width, expected.height));
    assert_eq!((inn.width(), inn.height()), (2, 2));
    assert_eq!(Some(inn.health), base_health(BuildingType::Inn, 1));
    assert_eq!(inn.health, initial_health(BuildingType::Inn));
    assert_eq!(inn.health, 500);
}

#[test]
fn test_swarm_starts_with_empty_level_one_health() {
    let mut map = all_grass_map(8, 8);
    let swarm = map.place_building(OWNER, BuildingType::Swarm, 0, 0);

    assert_eq!(swarm.level(), 0);
    assert_eq!((swarm.width(), swarm.height()), (3, 3));
    assert_eq!(swarm.health, 0);
}

#[test]
fn test_lookup_misses_outside_every_footprint() {
    let mut map = all_grass_map(16, 16);
    map.place_building(OWNER, BuildingType::Inn, 2, 2);
    map.place_building(OWNER, BuildingType::Swarm, 10, 10);

    for (x, y) in [(0, 0), (4, 2), (2, 4), (1, 1), (9, 10), (13, 10), (10, 13), (15, 15)] {
        assert!(map.building_at(x, y).is_none(), "unexpected building at ({x}, {y})");
    }
    assert!(map.building_at(3, 3).is_some());
    assert!(map.building_at(12, 12).is_some());
}

#[test]
fn test_lookup_follows_upgrade() {
    let mut map = all_grass_map(16, 16);
    let id = map.place_building(OWNER, BuildingType::Inn, 0, 0).id();
    assert!(map.building_at(2, 2).is_none());

    map.building_at_mut(0, 0).unwrap().upgrade().unwrap();
    map.building_at_mut(0, 0).unwrap().upgrade().unwrap();
    assert_eq!(map.building_at(2, 2).map(|b| b.id()), Some(id));
    assert!(map.building_at_mut(0, 0).unwrap().upgrade().is_err());
}

#[test]
fn test_placement_policy_check() {
    let mut map = all_grass_map(8, 8);
    assert_eq!(
        map.check_placement(BuildingType::Swarm, 0, 0),
        PlacementResult::Valid
    );
    let id = map.place_building(OWNER, BuildingType::Swarm, 0, 0).id();
    assert_eq!(
        map.check_placement(BuildingType::Inn, 2, 2),
        PlacementResult::Overlaps(id)
    );
    assert_eq!(
        map.check_placement(BuildingType::Inn, 3, 3),
        PlacementResult::Valid
    );
    assert_eq!(
        map.check_placement(BuildingType::Inn, 7, 0),
        PlacementResult::OutOfBounds
    );
}

#[test]
fn test_removed_building_no_longer_found() {
    let mut map = all_grass_map(8, 8);
    let id = map.place_building(OWNER, BuildingType::Inn, 1, 1).id();
    let entry = map.remove_building(id).unwrap();
    assert_eq!((entry.x, entry.y), (1, 1));
    assert!(map.building_at(1, 1).is_none());
    assert!(map.remove_building(id).is_none());
}

/// Places non-overlapping buildings on a 3-cell lattice.
fn lattice_map(kinds: &[BuildingType]) -> (Map, Vec<(u32, u32)>) {
    let mut map = all_grass_map(32, 32);
    let mut anchors = Vec::new();
    for (i, &kind) in kinds.iter().enumerate() {
        let i = i as u32;
        let anchor = ((i % 10) * 3, (i / 10) * 3);
        map.place_building(OWNER, kind, anchor.0, anchor.1);
        anchors.push(anchor);
    }
    (map, anchors)
}

proptest! {
    /// Lookup never returns a building whose footprint excludes the point.
    #[test]
    fn prop_lookup_is_sound(
        kinds in prop::collection::vec(arb_building_type(), 1..30),
        (x, y) in arb_coord(32, 32),
    ) {
        let (map, _) = lattice_map(&kinds);
        if let Some(entry) = map.buildings().entry_at(x, y) {
            prop_assert!(x >= entry.x && x < entry.x + entry.building.width());
            prop_assert!(y >= entry.y && y < entry.y + entry.building.height());
        }
    }

    /// Every cell of every placed building resolves to that building.
    #[test]
    fn prop_lookup_is_complete(kinds in prop::collection::vec(arb_building_type(), 1..30)) {
        let (map, _) = lattice_map(&kinds);
        for entry in map.buildings().entries() {
            for dx in 0..entry.building.width() {
                for dy in 0..entry.building.height() {
                    let found = map.building_at(entry.x + dx, entry.y + dy).map(|b| b.id());
                    prop_assert_eq!(found, Some(entry.building.id()));
                }
            }
        }
    }
}
