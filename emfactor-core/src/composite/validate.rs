//! Validation of composite definitions before persistence.
//!
//! All rules are evaluated independently and every violation is collected;
//! nothing short-circuits. Validation performs no aggregation and must run
//! before a composite is saved — a composite that fails validation is never
//! persisted and its cached value is not to be trusted.

use crate::units::units_compatible;
use serde::{Deserialize, Serialize};

/// What validation sees of a component: the referenced factor's unit and the
/// component's weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub unit: String,
    pub weight: f64,
}

impl ComponentSpec {
    pub fn new(unit: impl Into<String>, weight: f64) -> Self {
        Self {
            unit: unit.into(),
            weight,
        }
    }
}

/// Outcome of validating a composite definition.
///
/// The error strings are advisory output for the caller to surface verbatim;
/// they are not an exception channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    /// A passing result with no errors.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Checks that a component list forms a well-formed composite at the target
/// unit.
///
/// Rules, each contributing its own error when violated:
///
/// 1. the list must be non-empty;
/// 2. every component unit must be compatible with the target unit — one
///    aggregated error naming each incompatible component by position;
/// 3. every weight must be strictly positive — one aggregated error no
///    matter how many components offend.
///
/// A strictly-positive weight rule also guarantees that a valid `Weighted`
/// composite always has a nonzero total weight, so the aggregator's
/// zero-weight fallback is unreachable for persisted composites.
#[must_use]
pub fn validate(components: &[ComponentSpec], target_unit: &str) -> Validation {
    let mut errors = Vec::new();

    if components.is_empty() {
        errors.push("at least one component required".to_string());
    }

    let incompatible: Vec<String> = components
        .iter()
        .enumerate()
        .filter(|(_, c)| !units_compatible(&c.unit, target_unit))
        .map(|(i, c)| format!("component {} ('{}')", i + 1, c.unit))
        .collect();
    if !incompatible.is_empty() {
        errors.push(format!(
            "units incompatible with target '{}': {}",
            target_unit,
            incompatible.join(", ")
        ));
    }

    // NaN weights fail this comparison too.
    if components.iter().any(|c| !(c.weight > 0.0)) {
        errors.push("component weights must be greater than zero".to_string());
    }

    Validation::from_errors(errors)
}
