//! Facade crate for the emission factor catalog.
//!
//! Re-exports the engine ([`emfactor_core`]) and the bookkeeping layer
//! ([`emfactor_catalog`]) under one roof.

pub use emfactor_catalog::{
    import_pack, search, sync, Dataset, DatasetStore, FactorCatalog, FactorFilter, LibraryIndex,
    LibraryStatus,
};
pub use emfactor_core::composite::{
    aggregate, validate, ComponentInput, ComponentSpec, CompositeComponent, CompositeFactor,
    FormulaType, Validation,
};
pub use emfactor_core::errors::{FactorError, FactorResult};
pub use emfactor_core::factor::{
    EmissionFactor, FactorId, GasBreakdown, Provenance, SourceKind,
};
pub use emfactor_core::format::{format_factor, format_value};
pub use emfactor_core::units::{normalize, units_compatible, Unit};
