//! Central-library membership and factor pack import.
//!
//! The central library is canonical and remote; locally it is modelled as a
//! status flag per factor id plus an import path for TOML factor packs.
//!
//! A pack is a TOML document of `[[factor]]` tables:
//!
//! ```toml
//! [[factor]]
//! name = "Natural gas combustion"
//! value = 2.0322
//! unit = "kg CO2e/m³"
//! kind = "standard"
//! region = "GB"
//! year = 2024
//! ```

use crate::catalog::FactorCatalog;
use emfactor_core::errors::{FactorError, FactorResult};
use emfactor_core::factor::{EmissionFactor, FactorId, GasBreakdown, Provenance, SourceKind};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a factor stands relative to the central library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryStatus {
    /// Exists only in this session.
    #[default]
    Local,
    /// Submitted to the central library.
    Published,
    /// Pulled from, or reconciled with, the central library.
    Synced,
}

/// Tracks library membership per factor id.
///
/// Any id not explicitly tracked is [`LibraryStatus::Local`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryIndex {
    statuses: HashMap<FactorId, LibraryStatus>,
}

impl LibraryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, id: FactorId) -> LibraryStatus {
        self.statuses.get(&id).copied().unwrap_or_default()
    }

    pub fn publish(&mut self, id: FactorId) {
        self.statuses.insert(id, LibraryStatus::Published);
    }

    pub fn mark_synced(&mut self, id: FactorId) {
        self.statuses.insert(id, LibraryStatus::Synced);
    }

    /// Ids with the given status, ascending.
    pub fn with_status(&self, status: LibraryStatus) -> Vec<FactorId> {
        let mut ids: Vec<FactorId> = self
            .statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// One `[[factor]]` table in a pack.
#[derive(Debug, Clone, Deserialize)]
struct PackEntry {
    name: String,
    value: f64,
    unit: String,
    #[serde(default = "default_kind")]
    kind: SourceKind,
    #[serde(default)]
    gases: Option<GasBreakdown>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    method: Option<String>,
}

fn default_kind() -> SourceKind {
    SourceKind::Standard
}

#[derive(Debug, Clone, Deserialize)]
struct FactorPack {
    #[serde(default, rename = "factor")]
    factors: Vec<PackEntry>,
}

/// Parses a TOML factor pack and inserts its factors under fresh ids.
///
/// The whole document is parsed before anything is inserted, so a malformed
/// pack leaves the catalog untouched. Returns the new ids in pack order.
pub fn import_pack(catalog: &mut FactorCatalog, text: &str) -> FactorResult<Vec<FactorId>> {
    let pack: FactorPack =
        toml::from_str(text).map_err(|e| FactorError::Import(e.to_string()))?;

    let mut ids = Vec::with_capacity(pack.factors.len());
    for entry in pack.factors {
        let id = catalog.allocate_id();
        let mut factor = EmissionFactor::new(id, entry.name, entry.value, entry.unit, entry.kind);
        factor.gases = entry.gases;
        factor.provenance = Provenance {
            source: entry.source,
            region: entry.region,
            year: entry.year,
            method: entry.method,
            version: 1,
        };
        catalog.add_factor(factor)?;
        debug!("imported factor {id}");
        ids.push(id);
    }
    info!("imported {} factors from pack", ids.len());
    Ok(ids)
}

/// Pulls a pack from the central library: imports it and marks every
/// imported factor as synced.
pub fn sync(
    catalog: &mut FactorCatalog,
    index: &mut LibraryIndex,
    text: &str,
) -> FactorResult<Vec<FactorId>> {
    let ids = import_pack(catalog, text)?;
    for id in &ids {
        index.mark_synced(*id);
    }
    Ok(ids)
}
