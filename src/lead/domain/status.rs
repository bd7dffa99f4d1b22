//! Lead working-status taxonomy and the final-status derivation rule.

use super::{ParseFinalStatusError, ParseLeadStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Working status an agent assigns to a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    /// Borrower is paid in cash.
    #[serde(rename = "cash salary")]
    CashSalary,
    /// Borrower is self employed.
    #[serde(rename = "self employed")]
    SelfEmployed,
    /// Borrower is not interested.
    #[serde(rename = "NI")]
    NotInterested,
    /// Borrower has not answered for more than three days.
    #[serde(rename = "ring more than 3 days")]
    RingMoreThanThreeDays,
    /// Borrower's salary is below the lending threshold.
    #[serde(rename = "salary low")]
    SalaryLow,
    /// Borrower's credit bureau record disqualifies them.
    #[serde(rename = "cibil issue")]
    CibilIssue,
    /// Banking documents have been received; the lead qualifies.
    #[serde(rename = "banking received")]
    BankingReceived,
}

impl LeadStatus {
    /// Every status in the taxonomy, in display order.
    pub const ALL: [Self; 7] = [
        Self::CashSalary,
        Self::SelfEmployed,
        Self::NotInterested,
        Self::RingMoreThanThreeDays,
        Self::SalaryLow,
        Self::CibilIssue,
        Self::BankingReceived,
    ];

    /// Statuses that close a lead.
    pub const CLOSE_STATUSES: [Self; 6] = [
        Self::CashSalary,
        Self::SelfEmployed,
        Self::NotInterested,
        Self::RingMoreThanThreeDays,
        Self::SalaryLow,
        Self::CibilIssue,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CashSalary => "cash salary",
            Self::SelfEmployed => "self employed",
            Self::NotInterested => "NI",
            Self::RingMoreThanThreeDays => "ring more than 3 days",
            Self::SalaryLow => "salary low",
            Self::CibilIssue => "cibil issue",
            Self::BankingReceived => "banking received",
        }
    }

    /// Returns the final status this working status implies.
    #[must_use]
    pub fn final_status(self) -> FinalStatus {
        if Self::CLOSE_STATUSES.contains(&self) {
            FinalStatus::Close
        } else {
            FinalStatus::Open
        }
    }

    /// Returns `true` for the status that spawns a loan application.
    #[must_use]
    pub const fn is_qualifying(self) -> bool {
        matches!(self, Self::BankingReceived)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = ParseLeadStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| ParseLeadStatusError(value.to_owned()))
    }
}

/// Whether a lead is still being worked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    /// The lead is still being worked.
    #[default]
    Open,
    /// The lead has been closed out.
    Close,
}

impl FinalStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FinalStatus {
    type Error = ParseFinalStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            _ => Err(ParseFinalStatusError(value.to_owned())),
        }
    }
}

/// Derives a lead's final status from its working status.
///
/// Unset statuses are open. This is the only place the mapping is decided.
#[must_use]
pub fn derive_final_status(status: Option<LeadStatus>) -> FinalStatus {
    status.map_or(FinalStatus::Open, LeadStatus::final_status)
}
