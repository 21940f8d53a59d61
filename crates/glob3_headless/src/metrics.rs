//! Run metrics collection and the end-of-run report.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glob3_core::events::{ChangeSet, Subscriber};
use glob3_core::game::World;
use glob3_core::map::Map;
use glob3_core::player::{Player, PlayerInfo, PlayerKind};
use serde::{Deserialize, Serialize};

/// Map activity observed while the game ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStats {
    /// Number of `map_change` firings.
    pub map_change_events: u64,
    /// Cells reported across all firings, duplicates included.
    pub cells_changed: u64,
    /// Largest single change-set.
    pub largest_change_set: u64,
}

/// Subscriber feeding a shared [`ChangeStats`].
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    stats: Rc<RefCell<ChangeStats>>,
}

impl MetricsCollector {
    /// A collector with zeroed stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the stats, readable after the collector has been moved into
    /// a player.
    #[must_use]
    pub fn stats(&self) -> Rc<RefCell<ChangeStats>> {
        Rc::clone(&self.stats)
    }
}

impl Subscriber for MetricsCollector {
    fn on_map_change(&mut self, _world: &mut World, _player: &PlayerInfo, changes: &ChangeSet) {
        let mut stats = self.stats.borrow_mut();
        let len = changes.len() as u64;
        stats.map_change_events += 1;
        stats.cells_changed += len;
        stats.largest_change_set = stats.largest_change_set.max(len);
    }
}

/// Cells and total quantity of one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTotal {
    /// Cells holding the resource.
    pub cells: u64,
    /// Sum of amounts.
    pub amount: u64,
}

/// One player in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Player id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// `human` or `ai`.
    pub kind: String,
    /// Buildings owned at the end.
    pub buildings: usize,
}

/// Everything worth knowing about a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Sampler seed, `None` when seeded from entropy.
    pub seed: Option<u64>,
    /// Map width.
    pub size_x: u32,
    /// Map height.
    pub size_y: u32,
    /// Ticks run.
    pub ticks: u64,
    /// Whether networking was enabled.
    pub network_enabled: bool,
    /// Players in event order.
    pub players: Vec<PlayerSummary>,
    /// Map activity.
    pub changes: ChangeStats,
    /// Resources on the final map, by kind.
    pub resources: BTreeMap<String, ResourceTotal>,
    /// Buildings on the final map.
    pub buildings: usize,
    /// Final map hash (for determinism validation).
    pub final_state_hash: u64,
}

impl RunReport {
    /// Summarize the final map and players.
    #[must_use]
    pub fn collect(map: &Map, players: &[Player], ticks: u64, changes: ChangeStats) -> Self {
        let mut resources: BTreeMap<String, ResourceTotal> = BTreeMap::new();
        for (_, cell) in map.cells() {
            if let Some(deposit) = cell.deposit() {
                let total = resources
                    .entry(format!("{:?}", deposit.kind()).to_lowercase())
                    .or_default();
                total.cells += 1;
                total.amount += u64::from(deposit.amount());
            }
        }

        let players = players
            .iter()
            .map(|player| PlayerSummary {
                id: player.id().0,
                name: player.info().name().to_string(),
                kind: match player.info().kind() {
                    PlayerKind::Human => "human".to_string(),
                    PlayerKind::Ai => "ai".to_string(),
                },
                buildings: map
                    .buildings()
                    .entries()
                    .filter(|entry| entry.building.owner() == player.id())
                    .count(),
            })
            .collect();

        Self {
            size_x: map.size_x(),
            size_y: map.size_y(),
            ticks,
            players,
            changes,
            resources,
            buildings: map.buildings().len(),
            final_state_hash: map.state_hash(),
            ..Default::default()
        }
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let resources: Vec<String> = self
            .resources
            .iter()
            .map(|(kind, total)| format!("{kind}={}/{}", total.cells, total.amount))
            .collect();
        format!(
            "{} ticks on {}x{}, {} map changes ({} cells), resources [{}], hash {:016x}",
            self.ticks,
            self.size_x,
            self.size_y,
            self.changes.map_change_events,
            self.changes.cells_changed,
            resources.join(" "),
            self.final_state_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use glob3_core::buildings::BuildingType;
    use glob3_core::player::PlayerId;
    use glob3_core::terrain::{ResourceKind, Terrain, TerrainType};
    use glob3_test_utils::fixtures::{all_grass_map, set_cell};

    use super::*;

    #[test]
    fn test_collect_counts_resources_and_buildings() {
        let mut map = all_grass_map(4, 4);
        set_cell(&mut map, 0, 0, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 3));
        set_cell(&mut map, 1, 0, Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 4));
        set_cell(&mut map, 2, 2, Terrain::with_resource(TerrainType::Water, ResourceKind::Algae, 1));
        map.place_building(PlayerId(2), BuildingType::Inn, 2, 0);

        let players = vec![
            Player::new(PlayerId(1), "test", PlayerKind::Human),
            Player::new(PlayerId(2), "ai-1", PlayerKind::Ai),
        ];
        let report = RunReport::collect(&map, &players, 12, ChangeStats::default());

        assert_eq!(report.ticks, 12);
        assert_eq!(report.buildings, 1);
        assert_eq!(report.resources["wheat"], ResourceTotal { cells: 2, amount: 7 });
        assert_eq!(report.resources["algae"], ResourceTotal { cells: 1, amount: 1 });
        assert!(!report.resources.contains_key("wood"));
        assert_eq!(report.players[0].buildings, 0);
        assert_eq!(report.players[1].buildings, 1);
        assert_eq!(report.players[1].kind, "ai");
    }

    #[test]
    fn test_json_round_trip() {
        let report = RunReport {
            seed: Some(7),
            ticks: 3,
            ..Default::default()
        };
        let json = report.to_json().unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_collector_accumulates() {
        let collector = MetricsCollector::new();
        let stats = collector.stats();
        let mut collector = collector;
        let mut world = World::new(all_grass_map(2, 2));
        let info = PlayerInfo::new(PlayerId(1), "test", PlayerKind::Human);

        let first: ChangeSet = vec![(0, 0), (1, 1)].into_iter().collect();
        let second: ChangeSet = vec![(1, 0)].into_iter().collect();
        collector.on_map_change(&mut world, &info, &first);
        collector.on_map_change(&mut world, &info, &second);

        assert_eq!(
            *stats.borrow(),
            ChangeStats {
                map_change_events: 2,
                cells_changed: 3,
                largest_change_set: 2,
            }
        );
    }
}
