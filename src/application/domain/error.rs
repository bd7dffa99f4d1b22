//! Error types for the application pipeline domain.

use super::ApplicationId;
use thiserror::Error;

/// Errors returned by pipeline transitions and application value types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineDomainError {
    /// Entering Disbursed was attempted without a disbursed amount.
    #[error("application {0} cannot be disbursed without a disbursed amount")]
    DisbursedAmountRequired(ApplicationId),

    /// The disbursed amount is not a positive whole number of rupees.
    #[error("invalid disbursed amount '{0}', expected a positive amount")]
    InvalidDisbursedAmount(String),

    /// The interest rate is not a percentage with at most two decimals.
    #[error("invalid interest rate '{0}', expected a percentage such as 10.5")]
    InvalidInterestRate(String),
}

/// Error returned while parsing pipeline stages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application stage: {0}")]
pub struct ParseStageError(pub String);
