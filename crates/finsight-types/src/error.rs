//! Error types for finsight domain values

use thiserror::Error;

/// Result type for domain-level conversions
pub type Result<T> = std::result::Result<T, TypesError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// A label that is not part of the closed category set
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown risk tolerance: {0}")]
    UnknownRiskTolerance(String),

    #[error("Unknown transaction type: {0}")]
    UnknownTransactionType(String),
}
