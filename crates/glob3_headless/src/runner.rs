//! Headless game runner implementation.
//!
//! Builds the map, seats the players, places each player's starting Inn,
//! attaches the subscribers a front end would and runs the tick loop to
//! completion.

use std::io::{self, Write};

use glob3_core::buildings::BuildingType;
use glob3_core::config::CoreConfig;
use glob3_core::error::GameError;
use glob3_core::events::EventKind;
use glob3_core::game::{Game, TickLimit};
use glob3_core::growth::{RandomSampler, ResourceGrowth};
use glob3_core::map::{Coord, Map};
use glob3_core::player::{Player, PlayerId, PlayerKind};
use thiserror::Error;

use crate::ascii_view::{AsciiConfig, AsciiView};
use crate::metrics::{MetricsCollector, RunReport};

/// Default number of ticks for a run.
pub const DEFAULT_TICKS: u64 = 200;

/// Name of the local human player.
pub const HUMAN_PLAYER_NAME: &str = "test";

/// Error type for a headless run.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration rejected by the core.
    #[error(transparent)]
    Game(#[from] GameError),
    /// A run needs at least one player.
    #[error("At least one player is required")]
    NoPlayers,
}

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Map and growth settings.
    pub core: CoreConfig,
    /// Ticks to run before ending the game.
    pub ticks: u64,
    /// Growth sampler seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Total players: one human plus `players - 1` AI players.
    pub players: u32,
    /// Whether networking is enabled.
    pub network: bool,
    /// Run without a view attached.
    pub daemon: bool,
    /// View settings when not running as a daemon.
    pub ascii: AsciiConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            ticks: DEFAULT_TICKS,
            seed: None,
            players: 1,
            network: true,
            daemon: false,
            ascii: AsciiConfig::default(),
        }
    }
}

/// Runs one game without a graphical front end.
pub struct HeadlessRunner<W = io::Stdout> {
    config: RunnerConfig,
    view_out: Option<W>,
}

impl HeadlessRunner<io::Stdout> {
    /// A runner drawing its view to stdout.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_output(config, io::stdout())
    }
}

impl<W: Write + 'static> HeadlessRunner<W> {
    /// A runner drawing its view to `out`.
    pub fn with_output(config: RunnerConfig, out: W) -> Self {
        Self {
            config,
            view_out: Some(out),
        }
    }

    /// Run the game and report on the final state.
    pub fn run(mut self) -> Result<RunReport, RunnerError> {
        let config = &self.config;
        config.core.validate()?;
        if config.players == 0 {
            return Err(RunnerError::NoPlayers);
        }

        if config.daemon {
            tracing::info!("Running as daemon.");
        }
        if !config.network {
            tracing::info!("Networking disabled.");
        }

        let mut map = Map::from_config(&config.core.map);
        let mut players = Vec::with_capacity(config.players as usize);
        for index in 0..config.players {
            let player = seat_player(index);
            place_starting_inn(&mut map, player.id(), index);
            players.push(player);
        }

        let sampler = match config.seed {
            Some(seed) => RandomSampler::seeded(seed),
            None => RandomSampler::from_entropy(),
        };
        let collector = MetricsCollector::new();
        let stats = collector.stats();

        // Growth, metrics and the tick limit act for the first player so
        // they run exactly once per tick.
        let first = &mut players[0];
        first.register(
            ResourceGrowth::new(config.core.growth.clone(), sampler),
            &[EventKind::GameTick],
        );
        first.register(collector, &[EventKind::MapChange]);
        first.register(TickLimit::new(config.ticks), &[EventKind::GameTick]);
        if !config.daemon {
            if let Some(out) = self.view_out.take() {
                first.register(
                    AsciiView::new(config.ascii.clone(), out),
                    &[EventKind::GameStart, EventKind::MapChange, EventKind::GameEnd],
                );
            }
        }

        let mut game = Game::new(map).with_network(config.network);
        for player in players {
            game.add_player(player)?;
        }
        game.run();

        let ticks = game.world().tick();
        let network_enabled = game.network_enabled();
        let (map, players) = game.into_parts();
        let changes = *stats.borrow();

        let mut report = RunReport::collect(&map, &players, ticks, changes);
        report.seed = config.seed;
        report.network_enabled = network_enabled;
        tracing::info!(ticks, hash = report.final_state_hash, "Run complete");
        Ok(report)
    }
}

fn seat_player(index: u32) -> Player {
    let id = PlayerId(index + 1);
    if index == 0 {
        Player::new(id, HUMAN_PLAYER_NAME, PlayerKind::Human)
    } else {
        Player::new(id, format!("ai-{index}"), PlayerKind::Ai)
    }
}

/// Preferred anchor for a player's Inn: corners first, inset by two cells.
fn preferred_anchor(map: &Map, index: u32) -> Coord {
    let far_x = map.size_x().saturating_sub(4);
    let far_y = map.size_y().saturating_sub(4);
    let corners = [(2, 2), (far_x, far_y), (far_x, 2), (2, far_y)];
    corners[index as usize % corners.len()]
}

/// Place the player's Inn at the first free spot, starting from its corner
/// and scanning the map row by row. Maps without room get no Inn.
fn place_starting_inn(map: &mut Map, owner: PlayerId, index: u32) {
    let preferred = preferred_anchor(map, index);
    let scan = (0..map.size_y()).flat_map(|y| (0..map.size_x()).map(move |x| (x, y)));
    let spot = std::iter::once(preferred)
        .chain(scan)
        .find(|&(x, y)| map.check_placement(BuildingType::Inn, x, y).is_valid());

    match spot {
        Some((x, y)) => {
            map.place_building(owner, BuildingType::Inn, x, y);
            tracing::debug!(player = owner.0, x, y, "Starting Inn placed");
        }
        None => tracing::warn!(player = owner.0, "No room for a starting Inn"),
    }
}
