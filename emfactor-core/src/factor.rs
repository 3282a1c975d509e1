//! The emission factor data model.
//!
//! An [`EmissionFactor`] is an immutable record: once created it is never
//! edited in place. Corrections and updates are published as new records with
//! a bumped [`Provenance::version`], and the old record is kept so historical
//! references stay resolvable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a factor or composite in a catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct FactorId(pub u64);

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a factor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Published by a standards body (e.g. a national inventory database).
    Standard,
    /// Supplier-specific data.
    Supplier,
    /// Received over a PACT data exchange.
    PactExchange,
    /// Entered locally by a user.
    UserDefined,
}

impl SourceKind {
    /// Returns a display name for this source classification.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Standard => "Standard",
            SourceKind::Supplier => "Supplier",
            SourceKind::PactExchange => "PACT exchange",
            SourceKind::UserDefined => "User defined",
        }
    }
}

/// Optional gas-specific sub-factors making up a factor's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GasBreakdown {
    pub co2: Option<f64>,
    pub ch4: Option<f64>,
    pub n2o: Option<f64>,
}

impl GasBreakdown {
    /// True if no gas-specific value is present.
    pub fn is_empty(&self) -> bool {
        self.co2.is_none() && self.ch4.is_none() && self.n2o.is_none()
    }
}

/// Provenance metadata carried by every factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Record version, bumped on supersede.
    pub version: u32,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            source: None,
            region: None,
            year: None,
            method: None,
            version: 1,
        }
    }
}

/// An emission factor: a coefficient converting an activity quantity into an
/// equivalent mass of greenhouse gas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub id: FactorId,
    pub name: String,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gases: Option<GasBreakdown>,
    #[serde(default)]
    pub provenance: Provenance,
    pub kind: SourceKind,
}

impl EmissionFactor {
    /// Create a new factor with default provenance and no gas breakdown.
    pub fn new(
        id: FactorId,
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        kind: SourceKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            unit: unit.into(),
            gases: None,
            provenance: Provenance::default(),
            kind,
        }
    }

    /// Attach gas-specific sub-factors.
    pub fn with_gases(mut self, gases: GasBreakdown) -> Self {
        self.gases = Some(gases);
        self
    }

    /// Attach provenance metadata.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}
