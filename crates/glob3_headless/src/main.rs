//! Headless Globulation 3 runner.
//!
//! Runs one game without graphics and prints the final map and a summary.
//! Logs go to stderr so stdout stays clean for the map or the JSON report.
//!
//! # Usage
//!
//! ```bash
//! # Default run: 200 ticks, 128x128 map, one player
//! cargo run -p glob3_headless
//!
//! # Seeded run with two AI opponents and a JSON report
//! cargo run -p glob3_headless -- --seed 7 --players 3 --json
//!
//! # Daemon mode: no view, networking off, verbose logs
//! cargo run -p glob3_headless -- --daemon --disable-net --loglevel debug
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glob3_headless::{
    ascii_view::AsciiConfig,
    config::load_config,
    runner::{HeadlessRunner, RunnerConfig, DEFAULT_TICKS},
};

/// Log verbosity accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "glob3_headless")]
#[command(about = "Run a Globulation 3 game without graphics")]
#[command(version)]
struct Cli {
    /// Log level (RUST_LOG overrides it)
    #[arg(long, value_enum, default_value = "info")]
    loglevel: LogLevel,

    /// Run without a view attached
    #[arg(long)]
    daemon: bool,

    /// Disable networking
    #[arg(long)]
    disable_net: bool,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = DEFAULT_TICKS)]
    ticks: u64,

    /// Growth seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Square map edge length, overrides the config file
    #[arg(long)]
    size: Option<u32>,

    /// RON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total players: one human, the rest AI
    #[arg(short, long, default_value = "1")]
    players: u32,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Colored ASCII output
    #[arg(long)]
    color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr (stdout is for the map and the report)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.loglevel.directive()));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(cli.color),
        )
        .with(filter)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut core = match &cli.config {
        Some(path) => load_config(path)?,
        None => Default::default(),
    };
    if let Some(size) = cli.size {
        core.map.size_x = size;
        core.map.size_y = size;
    }

    let config = RunnerConfig {
        core,
        ticks: cli.ticks,
        seed: cli.seed,
        players: cli.players,
        network: !cli.disable_net,
        daemon: cli.daemon,
        ascii: AsciiConfig {
            use_color: cli.color,
            ..Default::default()
        },
    };

    // The JSON report owns stdout, so the view draws nowhere.
    let report = if cli.json {
        HeadlessRunner::with_output(config, std::io::sink()).run()?
    } else {
        HeadlessRunner::new(config).run()?
    };

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        tracing::info!("{}", report.summary());
    }
    Ok(())
}
