//! # Globulation 3 Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Map fixtures and a scripted tile sampler
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
