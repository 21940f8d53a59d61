//! ASCII map renderer.
//!
//! Renders the terrain grid and buildings as text for quick terminal
//! review, and attaches to a game as a subscriber standing in for the
//! graphical front end.

use std::fmt::Write as _;
use std::io::Write;

use glob3_core::buildings::BuildingType;
use glob3_core::events::{ChangeSet, Subscriber};
use glob3_core::game::World;
use glob3_core::map::Map;
use glob3_core::player::PlayerInfo;
use glob3_core::terrain::{ResourceKind, Terrain, TerrainType, MAX_TERRAIN_RESOURCES};

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Maximum width of the viewport in characters.
    pub width: usize,
    /// Maximum height of the viewport in lines.
    pub height: usize,
    /// Print a legend under the map.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 40,
            show_legend: true,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[34m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Character for a cell. Dense deposits (at least half full) are uppercase.
fn cell_char(cell: &Terrain) -> char {
    let Some(deposit) = cell.deposit() else {
        return match cell.kind() {
            TerrainType::Grass => '.',
            TerrainType::Water => '~',
        };
    };
    let base = match deposit.kind() {
        ResourceKind::Wheat => 'w',
        ResourceKind::Wood => 't',
        ResourceKind::Stone => 's',
        ResourceKind::Algae => 'a',
    };
    if deposit.amount() * 2 >= MAX_TERRAIN_RESOURCES {
        base.to_ascii_uppercase()
    } else {
        base
    }
}

fn cell_color(cell: &Terrain) -> &'static str {
    match (cell.kind(), cell.resource()) {
        (_, Some(ResourceKind::Wheat)) => colors::YELLOW,
        (_, Some(ResourceKind::Wood | ResourceKind::Algae)) => colors::GREEN,
        (_, Some(ResourceKind::Stone)) => colors::GRAY,
        (TerrainType::Water, None) => colors::BLUE,
        (TerrainType::Grass, None) => "",
    }
}

const fn building_char(kind: BuildingType) -> char {
    match kind {
        BuildingType::Inn => '#',
        BuildingType::Swarm => '@',
    }
}

/// Render `map` as ASCII art.
///
/// Maps larger than the viewport are sampled down: each character shows
/// the cell at the top-left of the area it covers.
pub fn render_map(map: &Map, config: &AsciiConfig) -> String {
    let size_x = map.size_x() as usize;
    let size_y = map.size_y() as usize;
    let columns = size_x.min(config.width.max(1));
    let rows = size_y.min(config.height.max(1));

    let mut output = String::new();
    let _ = writeln!(output, "+{}+", "-".repeat(columns));

    for row in 0..rows {
        output.push('|');
        let y = (row * size_y / rows) as u32;
        for column in 0..columns {
            let x = (column * size_x / columns) as u32;
            let (ch, color) = match map.building_at(x, y) {
                Some(building) => (building_char(building.kind()), colors::BOLD),
                None => match map.get(x, y) {
                    Ok(cell) => (cell_char(cell), cell_color(cell)),
                    Err(_) => (' ', ""),
                },
            };
            if config.use_color && !color.is_empty() {
                output.push_str(color);
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
        }
        output.push_str("|\n");
    }

    let _ = writeln!(output, "+{}+", "-".repeat(columns));

    if config.show_legend {
        output.push_str(".=grass ~=water w=wheat t=wood s=stone a=algae (UPPER=dense) #=inn @=swarm\n");
        let _ = writeln!(
            output,
            "{}x{} cells, {} buildings",
            map.size_x(),
            map.size_y(),
            map.buildings().len()
        );
    }

    output
}

/// Subscriber standing in for the GUI: logs the lifecycle, counts map
/// changes and draws the final map.
pub struct AsciiView<W> {
    config: AsciiConfig,
    out: W,
    frames: u64,
    cells_changed: u64,
}

impl<W: Write> AsciiView<W> {
    /// Draw to `out` with the given settings.
    pub fn new(config: AsciiConfig, out: W) -> Self {
        Self {
            config,
            out,
            frames: 0,
            cells_changed: 0,
        }
    }

    fn draw(&mut self, map: &Map) {
        let frame = render_map(map, &self.config);
        if let Err(err) = self.out.write_all(frame.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(%err, "Failed to draw map");
        }
    }
}

impl<W: Write> Subscriber for AsciiView<W> {
    fn on_game_start(&mut self, world: &mut World, player: &PlayerInfo) {
        tracing::info!(
            player = player.name(),
            size_x = world.map().size_x(),
            size_y = world.map().size_y(),
            "Globulation 3"
        );
    }

    fn on_map_change(&mut self, _world: &mut World, _player: &PlayerInfo, changes: &ChangeSet) {
        self.frames += 1;
        self.cells_changed += changes.len() as u64;
    }

    fn on_game_end(&mut self, world: &mut World, _player: &PlayerInfo) {
        tracing::info!(
            ticks = world.tick(),
            redraws = self.frames,
            cells_changed = self.cells_changed,
            "View closed"
        );
        self.draw(world.map());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glob3_core::events::EventKind;
    use glob3_core::game::{Game, TickLimit};
    use glob3_core::player::{Player, PlayerId, PlayerKind};
    use glob3_test_utils::fixtures::{all_grass_map, set_cell};

    use super::*;

    /// Writer shared with the test after the view is boxed away.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn plain() -> AsciiConfig {
        AsciiConfig {
            show_legend: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_small_map() {
        let mut map = all_grass_map(4, 2);
        set_cell(&mut map, 0, 0, Terrain::new(TerrainType::Water));
        set_cell(
            &mut map,
            3,
            1,
            Terrain::with_resource(TerrainType::Grass, ResourceKind::Wheat, 7),
        );
        set_cell(
            &mut map,
            1,
            1,
            Terrain::with_resource(TerrainType::Grass, ResourceKind::Wood, 1),
        );

        let text = render_map(&map, &plain());
        assert_eq!(text, "+----+\n|~...|\n|.t.W|\n+----+\n");
    }

    #[test]
    fn test_buildings_drawn_over_terrain() {
        let mut map = all_grass_map(5, 3);
        map.place_building(PlayerId(1), BuildingType::Inn, 1, 0);

        let text = render_map(&map, &plain());
        assert_eq!(text, "+-----+\n|.##..|\n|.##..|\n|.....|\n+-----+\n");
    }

    #[test]
    fn test_large_map_sampled_to_viewport() {
        let map = all_grass_map(200, 100);
        let config = AsciiConfig {
            width: 50,
            height: 10,
            ..plain()
        };
        let text = render_map(&map, &config);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|line| line.chars().count() == 52));
    }

    #[test]
    fn test_view_draws_final_map_on_game_end() {
        let buf = SharedBuf::default();
        let mut player = Player::new(PlayerId(1), "test", PlayerKind::Human);
        player.register(
            AsciiView::new(plain(), buf.clone()),
            &[EventKind::GameStart, EventKind::MapChange, EventKind::GameEnd],
        );
        player.register(TickLimit::new(3), &[EventKind::GameTick]);

        let mut game = Game::new(all_grass_map(3, 1));
        game.add_player(player).unwrap();
        game.run();

        let drawn = String::from_utf8(buf.0.borrow().clone()).unwrap();
        assert_eq!(drawn, "+---+\n|...|\n+---+\n");
    }
}
