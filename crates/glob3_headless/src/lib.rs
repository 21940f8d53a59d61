//! Headless game runner for Globulation 3.
//!
//! Plays the part of the game's front end without graphics: it builds the
//! map from configuration, seats one human player and any number of AI
//! players, attaches resource growth and an ASCII view as subscribers and
//! runs the core tick loop.
//!
//! - **Config**: RON files parsed into [`glob3_core::config::CoreConfig`]
//! - **View**: the final map drawn as ASCII on stdout
//! - **Report**: a summary of the run, optionally as JSON
//!
//! # Example
//!
//! ```bash
//! # 200 ticks on the default 128x128 map
//! cargo run -p glob3_headless
//!
//! # Reproducible run with a JSON report
//! cargo run -p glob3_headless -- --seed 42 --ticks 500 --json
//! ```

pub mod ascii_view;
pub mod config;
pub mod metrics;
pub mod runner;

pub use ascii_view::{render_map, AsciiConfig, AsciiView};
pub use config::{config_from_ron_str, load_config, ConfigError};
pub use metrics::{ChangeStats, MetricsCollector, RunReport};
pub use runner::{HeadlessRunner, RunnerConfig, RunnerError};
