//! Error types for lead domain validation and parsing.

use super::{AppNo, NoteText};
use thiserror::Error;

/// Errors returned while constructing lead domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeadDomainError {
    /// The application number is empty after trimming.
    #[error("application number must not be empty")]
    EmptyAppNo,

    /// The application number exceeds the column limit.
    #[error("application number is {length} characters long, limit is {max}", max = AppNo::MAX_CHARS)]
    AppNoTooLong {
        /// Length of the rejected value in characters.
        length: usize,
    },

    /// The mobile number is not exactly ten digits.
    #[error("invalid mobile number '{0}', expected exactly 10 digits")]
    InvalidMobileNumber(String),

    /// The requested amount is outside the lending range.
    #[error("amount must be between ₹40,000 and ₹15,00,000, got {0}")]
    AmountOutOfRange(u64),

    /// The note is empty after trimming.
    #[error("note must not be empty")]
    EmptyNote,

    /// The note exceeds the character limit.
    #[error("note is {length} characters long, limit is {max}", max = NoteText::MAX_CHARS)]
    NoteTooLong {
        /// Length of the rejected note in characters.
        length: usize,
    },
}

/// Error returned while parsing lead working statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lead status: {0}")]
pub struct ParseLeadStatusError(pub String);

/// Error returned while parsing final statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown final status: {0}")]
pub struct ParseFinalStatusError(pub String);
