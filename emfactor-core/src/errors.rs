use crate::factor::FactorId;
use thiserror::Error;

/// Error type for invalid catalog operations.
///
/// The composite-factor engine itself (aggregation, validation, unit
/// compatibility) is total and never produces these; they come from the
/// bookkeeping layer when a lookup or mutation cannot be honoured.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorError {
    #[error("no factor with id {0}")]
    UnknownFactor(FactorId),
    #[error("no composite with id {0}")]
    UnknownComposite(FactorId),
    #[error("no dataset named '{0}'")]
    UnknownDataset(String),
    #[error("factor {0} already exists")]
    DuplicateFactor(FactorId),
    #[error("dataset '{0}' already exists")]
    DuplicateDataset(String),
    #[error("composite '{name}' failed validation: {}", .reasons.join("; "))]
    InvalidComposite { name: String, reasons: Vec<String> },
    #[error("composite {0} has been removed")]
    RemovedComposite(FactorId),
    #[error("factor pack import failed: {0}")]
    Import(String),
}

/// Convenience type for `Result<T, FactorError>`.
pub type FactorResult<T> = Result<T, FactorError>;
