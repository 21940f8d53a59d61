//! Fixed-point math utilities for deterministic simulation.
//!
//! Growth budgets and probabilities are fractional. They use
//! fixed-point arithmetic so that a seeded run produces the same
//! change-sets on every platform.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a fixed-point ratio `numerator / denominator` without floats.
///
/// # Panics
///
/// Panics if `denominator` is zero.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    assert!(denominator != 0, "ratio denominator must be non-zero");
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Scale an integer count by a fixed-point coefficient.
#[must_use]
pub fn scale(count: u64, coefficient: Fixed) -> Fixed {
    Fixed::saturating_from_num(count).saturating_mul(coefficient)
}
