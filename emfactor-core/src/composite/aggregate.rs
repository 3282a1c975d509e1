//! Aggregation of resolved components into a single value.

use super::FormulaType;
use log::warn;
use serde::{Deserialize, Serialize};

/// A resolved `(value, weight)` pair fed to the aggregator.
///
/// Resolving component factor ids to their values is the caller's job; the
/// aggregator never looks anything up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentInput {
    pub value: f64,
    pub weight: f64,
}

impl ComponentInput {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Reduces a component list to one value under the given formula.
///
/// - [`FormulaType::Sum`]: Σ(value·weight). An empty list yields 0 by
///   definition.
/// - [`FormulaType::Weighted`]: Σ(value·weight) / Σ(weight). A zero total
///   weight yields 0 rather than dividing by zero; validation rejects such a
///   component set before persistence, so the fallback only fires on inputs
///   that were never validated.
///
/// No rounding is applied; display precision belongs to the caller (see
/// [`crate::format::format_value`]).
#[must_use]
pub fn aggregate(components: &[ComponentInput], formula: FormulaType) -> f64 {
    let weighted_sum: f64 = components.iter().map(|c| c.value * c.weight).sum();
    match formula {
        FormulaType::Sum => weighted_sum,
        FormulaType::Weighted => {
            let total_weight: f64 = components.iter().map(|c| c.weight).sum();
            if total_weight == 0.0 {
                if !components.is_empty() {
                    warn!(
                        "weighted aggregation over {} components with zero total weight; \
                         result defined as 0",
                        components.len()
                    );
                }
                0.0
            } else {
                weighted_sum / total_weight
            }
        }
    }
}
