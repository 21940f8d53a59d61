//! Determinism testing utilities.
//!
//! Growth is random, but only through the sampler it is handed. With a
//! seeded [`RandomSampler`] every pass must be reproducible: same seed, same
//! map, same change-sets. This module provides a harness for checking that.
//!
//! # Sources of non-determinism
//!
//! - **Floating-point math**: growth budgets use [`glob3_core::math::Fixed`].
//! - **Entropy-seeded samplers**: tests use [`RandomSampler::seeded`].
//! - **HashMap iteration order**: the map and registries are plain vectors.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use glob3_core::config::{GrowthConfig, MapConfig};
use glob3_core::growth::{grow, RandomSampler};
use glob3_core::map::Map;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run ended in the same state.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Growth is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one tick
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::warn!(runs, ticks, ?hashes, "Runs ended in different states");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// A map with its own seeded sampler, advanced one growth pass at a time.
#[derive(Debug, Clone)]
pub struct GrowthRun {
    /// The map being grown.
    pub map: Map,
    /// Growth tuning.
    pub config: GrowthConfig,
    sampler: RandomSampler,
    changes: u64,
}

impl GrowthRun {
    /// A standard map from `map_config`, grown with `seed`.
    #[must_use]
    pub fn new(map_config: &MapConfig, config: GrowthConfig, seed: u64) -> Self {
        Self::on_map(Map::from_config(map_config), config, seed)
    }

    /// Grow an existing map with `seed`.
    #[must_use]
    pub fn on_map(map: Map, config: GrowthConfig, seed: u64) -> Self {
        Self {
            map,
            config,
            sampler: RandomSampler::seeded(seed),
            changes: 0,
        }
    }

    /// Run one growth pass.
    pub fn step(&mut self) {
        let changes = grow(&mut self.map, &self.config, &mut self.sampler);
        self.changes += changes.len() as u64;
    }

    /// Cells changed so far, duplicates included.
    #[must_use]
    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// Hash of the map contents and the change count.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.map.state_hash().hash(&mut hasher);
        self.changes.hash(&mut hasher);
        hasher.finish()
    }
}

/// Run two growth runs side by side, returning the first pass after which
/// they differ.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(tick)` if they diverge at that
/// tick (0 means the initial states already differ).
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> GrowthRun,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        tracing::warn!("Initial states differ");
        return Some(0);
    }

    for tick in 1..=num_ticks {
        first.step();
        second.step();

        if first.state_hash() != second.state_hash() {
            tracing::warn!(
                tick,
                first_changes = first.changes(),
                second_changes = second.changes(),
                "Growth runs diverged"
            );
            return Some(tick);
        }
    }

    tracing::debug!(ticks = num_ticks, "No divergence");
    None
}

/// Run the same growth setup on several threads and collect the final map
/// hashes.
pub fn run_parallel_growth<F>(setup_fn: F, num_runs: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> GrowthRun + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut run = setup_fn();
                    for _ in 0..num_ticks {
                        run.step();
                    }
                    run.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(hash) => hash,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Verify that a map snapshot taken after `num_ticks` passes restores to the
/// same state.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> GrowthRun,
{
    let mut run = setup_fn();

    for _ in 0..num_ticks {
        run.step();
    }

    let hash_before = run.map.state_hash();

    let bytes = match run.map.serialize() {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(%err, "Snapshot failed");
            return false;
        }
    };
    let restored = match Map::deserialize(&bytes) {
        Ok(map) => map,
        Err(err) => {
            tracing::warn!(%err, "Snapshot did not restore");
            return false;
        }
    };

    let matches = restored.state_hash() == hash_before;
    if !matches {
        tracing::warn!(ticks = num_ticks, "Restored map hash differs");
    }
    matches
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
