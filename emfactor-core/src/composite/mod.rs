//! Composite factors: derived factors computed from weighted combinations of
//! other factors.
//!
//! A composite declares a [`FormulaType`], a target unit, and an ordered list
//! of `(factor, weight)` components. Its cached `value` must always equal
//! [`aggregate`] applied to the resolved components; the catalog recomputes
//! it whenever the component list changes.
//!
//! The engine here is purely functional: [`aggregate`] and [`validate`] take
//! plain data and return plain data, retain no state, and are total over
//! every input the data model can describe.
//!
//! # Aggregation formulas
//!
//! - [`FormulaType::Sum`]:
//!   $$ \text{result} = \sum_{i} v_i \cdot w_i $$
//! - [`FormulaType::Weighted`] (weighted average):
//!   $$ \text{result} = \frac{\sum_{i} v_i \cdot w_i}{\sum_{i} w_i} $$

pub mod aggregate;
pub mod validate;

pub use aggregate::{aggregate, ComponentInput};
pub use validate::{validate, ComponentSpec, Validation};

use crate::factor::FactorId;
use serde::{Deserialize, Serialize};

/// How a composite combines its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaType {
    /// Weighted sum of component values.
    Sum,
    /// Weighted average of component values.
    Weighted,
}

impl FormulaType {
    /// Returns a display name for this formula.
    pub fn name(&self) -> &'static str {
        match self {
            FormulaType::Sum => "Sum",
            FormulaType::Weighted => "Weighted",
        }
    }
}

/// One component of a composite: a referenced factor and its weight.
///
/// Weights must be strictly positive for the composite to validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeComponent {
    pub factor: FactorId,
    pub weight: f64,
}

impl CompositeComponent {
    pub fn new(factor: FactorId, weight: f64) -> Self {
        Self { factor, weight }
    }
}

/// A composite factor as persisted by the catalog.
///
/// `value` caches the aggregation result at the time the component list was
/// last changed. A composite that fails validation is never persisted, so a
/// stored composite always has a trustworthy cached value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeFactor {
    pub id: FactorId,
    pub name: String,
    pub formula: FormulaType,
    pub unit: String,
    pub components: Vec<CompositeComponent>,
    pub value: f64,
}
