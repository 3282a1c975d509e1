//! Unit compatibility for emission factor aggregation.
//!
//! Two units may be combined directly iff they normalize to the same string:
//! lowercased with all whitespace removed. `"kg CO2e"` and `" KG co2E "` are
//! compatible, `"kg CO2e"` and `"kg CO2e/kg"` are not. No unit algebra or
//! conversion factors are applied.
//!
//! This is deliberately the narrowest possible policy. Everything else in the
//! engine goes through [`units_compatible`] or [`Unit::is_compatible`], so a
//! real dimensional-analysis backend can replace the string comparison later
//! without touching aggregation or validation.
//!
//! # Example
//!
//! ```
//! use emfactor_core::units::{units_compatible, Unit};
//!
//! assert!(units_compatible("kg CO2e", " KG co2E "));
//! assert!(!units_compatible("kg CO2e", "kg CO2e/kg"));
//!
//! let u1 = Unit::new("kg CO2e");
//! let u2 = Unit::new("kgco2e");
//! assert_eq!(u1, u2); // Normalized comparison
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalizes a unit string for comparison.
///
/// Lowercases and strips all whitespace. Total over any input; an empty or
/// all-whitespace string normalizes to the empty string.
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Checks whether two unit strings may be aggregated without conversion.
///
/// Compatibility is reflexive, symmetric, and insensitive to case and
/// whitespace. Never errors or panics.
#[must_use]
pub fn units_compatible(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// A unit string paired with its normalized form.
///
/// Equality and hashing use the normalized representation, so
/// `Unit::new("kg CO2e") == Unit::new("KGCO2E")`. The original spelling is
/// preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// The original input string (preserved for display).
    original: String,
    /// The normalized comparison key.
    normalized: String,
}

impl Unit {
    pub fn new(input: impl Into<String>) -> Self {
        let original = input.into();
        let normalized = normalize(&original);
        Self {
            original,
            normalized,
        }
    }

    /// Returns the original input string.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns the normalized representation.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Returns true if this unit can be aggregated directly with the other.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        // Compare by normalized representation
        self.normalized == other.normalized
    }
}

impl Eq for Unit {}

impl std::hash::Hash for Unit {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash the normalized string for consistency with PartialEq
        self.normalized.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
