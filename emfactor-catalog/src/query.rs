//! Searching and filtering the catalog.
//!
//! Built with the builder idiom: start from [`FactorFilter::new`], chain the
//! criteria, then run [`search`] or test individual factors with
//! [`FactorFilter::matches`]. An empty filter matches everything.

use crate::catalog::FactorCatalog;
use emfactor_core::factor::{EmissionFactor, SourceKind};

/// Filter criteria for browsing factors. All set criteria must match.
#[derive(Debug, Clone, Default)]
pub struct FactorFilter {
    text: Option<String>,
    kind: Option<SourceKind>,
    region: Option<String>,
    years: Option<(i32, i32)>,
}

impl FactorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match against the factor name or its
    /// provenance source.
    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.text = Some(query.into().to_lowercase());
        self
    }

    pub fn kind(mut self, kind: SourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Case-insensitive equality against the provenance region. Factors
    /// without a region never match a region filter.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into().to_lowercase());
        self
    }

    /// Inclusive provenance-year range. Factors without a year never match.
    pub fn years(mut self, from: i32, to: i32) -> Self {
        self.years = Some((from, to));
        self
    }

    pub fn matches(&self, factor: &EmissionFactor) -> bool {
        if let Some(text) = &self.text {
            let in_name = factor.name.to_lowercase().contains(text);
            let in_source = factor
                .provenance
                .source
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(text));
            if !in_name && !in_source {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if factor.kind != kind {
                return false;
            }
        }
        if let Some(region) = &self.region {
            let matched = factor
                .provenance
                .region
                .as_deref()
                .is_some_and(|r| r.to_lowercase() == *region);
            if !matched {
                return false;
            }
        }
        if let Some((from, to)) = self.years {
            let matched = factor
                .provenance
                .year
                .is_some_and(|y| y >= from && y <= to);
            if !matched {
                return false;
            }
        }
        true
    }
}

/// Applies a filter over the catalog, returning matches in ascending id
/// order.
pub fn search<'a>(catalog: &'a FactorCatalog, filter: &FactorFilter) -> Vec<&'a EmissionFactor> {
    let mut matches: Vec<&EmissionFactor> =
        catalog.factors().filter(|f| filter.matches(f)).collect();
    matches.sort_unstable_by_key(|f| f.id);
    matches
}
