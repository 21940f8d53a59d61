//! Proptest strategies for maps, cells and buildings.

use glob3_core::buildings::BuildingType;
use glob3_core::map::Map;
use glob3_core::terrain::{ResourceKind, Terrain, TerrainType, MAX_TERRAIN_RESOURCES};
use proptest::prelude::*;

/// Any terrain type.
pub fn arb_terrain_type() -> impl Strategy<Value = TerrainType> {
    prop::sample::select(TerrainType::ALL.to_vec())
}

/// Any resource kind.
pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

/// Any building type.
pub fn arb_building_type() -> impl Strategy<Value = BuildingType> {
    prop::sample::select(BuildingType::ALL.to_vec())
}

/// A valid cell: any terrain, empty or holding `1..=MAX` of any resource.
///
/// Resources are not restricted to their habitat, mirroring hand-edited
/// maps.
pub fn arb_terrain() -> impl Strategy<Value = Terrain> {
    (
        arb_terrain_type(),
        arb_resource_kind(),
        0..=MAX_TERRAIN_RESOURCES,
    )
        .prop_map(|(kind, resource, amount)| Terrain::with_resource(kind, resource, amount))
}

/// A map of `1..=max_size` by `1..=max_size` cells filled with
/// [`arb_terrain`].
pub fn arb_map(max_size: u32) -> impl Strategy<Value = Map> {
    (1..=max_size, 1..=max_size).prop_flat_map(|(size_x, size_y)| {
        let area = (size_x * size_y) as usize;
        prop::collection::vec(arb_terrain(), area).prop_map(move |cells| {
            let mut map = Map::blank(size_x, size_y, TerrainType::Grass);
            for (index, cell) in cells.into_iter().enumerate() {
                let index = index as u32;
                if let Ok(target) = map.get_mut(index % size_x, index / size_x) {
                    *target = cell;
                }
            }
            map
        })
    })
}

/// A coordinate inside a `size_x` by `size_y` grid.
pub fn arb_coord(size_x: u32, size_y: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..size_x, 0..size_y)
}
