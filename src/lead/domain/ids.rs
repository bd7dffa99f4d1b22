//! Identifier and validated scalar types for the lead domain.

use super::LeadDomainError;
use crate::money::Rupees;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a lead record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(Uuid);

impl LeadId {
    /// Creates a new random lead identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a lead identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Business key of a lead, unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppNo(String);

impl AppNo {
    /// Maximum length in characters, matching the `app_no` column.
    pub const MAX_CHARS: usize = 64;

    /// Creates a validated application number.
    ///
    /// # Errors
    ///
    /// Returns [`LeadDomainError::EmptyAppNo`] when the value is blank and
    /// [`LeadDomainError::AppNoTooLong`] beyond [`Self::MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, LeadDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(LeadDomainError::EmptyAppNo);
        }
        let length = normalized.chars().count();
        if length > Self::MAX_CHARS {
            return Err(LeadDomainError::AppNoTooLong { length });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the application number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ten-digit mobile number, the secondary de-duplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Creates a validated mobile number.
    ///
    /// # Errors
    ///
    /// Returns [`LeadDomainError::InvalidMobileNumber`] unless the trimmed
    /// value is exactly ten ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, LeadDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = normalized.len() == Self::DIGITS
            && normalized.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(LeadDomainError::InvalidMobileNumber(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the mobile number as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requested loan amount on a lead, constrained to the lending range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct LeadAmount(u64);

impl LeadAmount {
    /// Smallest amount accepted, in rupees.
    pub const MIN: u64 = 40_000;
    /// Largest amount accepted, in rupees.
    pub const MAX: u64 = 1_500_000;

    /// Creates a validated lead amount.
    ///
    /// # Errors
    ///
    /// Returns [`LeadDomainError::AmountOutOfRange`] outside
    /// [`Self::MIN`]..=[`Self::MAX`].
    pub const fn new(value: u64) -> Result<Self, LeadDomainError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(LeadDomainError::AmountOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Returns the amount in rupees.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the amount as a monetary value.
    #[must_use]
    pub const fn as_rupees(self) -> Rupees {
        Rupees::new(self.0)
    }
}

impl TryFrom<u64> for LeadAmount {
    type Error = LeadDomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LeadAmount> for u64 {
    fn from(amount: LeadAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for LeadAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_rupees().fmt(f)
    }
}
