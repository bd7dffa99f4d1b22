//! The four pipeline stages.

use super::ParseStageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Stage {
    /// Newly spawned; awaiting a decision.
    UnderReview,
    /// Approved for lending.
    Approved,
    /// Rejected.
    Reject,
    /// Funds released. Entry requires a disbursed amount.
    Disbursed,
}

impl Stage {
    /// Every stage in board column order.
    pub const ALL: [Self; 4] = [Self::UnderReview, Self::Approved, Self::Reject, Self::Disbursed];

    /// Returns the canonical storage representation, also used as the
    /// board column identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderReview => "UnderReview",
            Self::Approved => "Approved",
            Self::Reject => "Reject",
            Self::Disbursed => "Disbursed",
        }
    }

    /// Returns the column heading shown on the board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnderReview => "Under Review",
            Self::Approved => "Approved",
            Self::Reject => "Rejected",
            Self::Disbursed => "Disbursed",
        }
    }

    /// Returns the identifier of the sortable card group inside this
    /// stage's column.
    #[must_use]
    pub const fn sortable_group_id(self) -> &'static str {
        match self {
            Self::UnderReview => "UnderReview:cards",
            Self::Approved => "Approved:cards",
            Self::Reject => "Reject:cards",
            Self::Disbursed => "Disbursed:cards",
        }
    }

    /// Resolves a board column identifier. Only exact identifiers match.
    #[must_use]
    pub fn from_column_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == id)
    }

    /// Returns `true` when entering this stage needs a disbursed amount.
    #[must_use]
    pub const fn requires_disbursed_amount(self) -> bool {
        matches!(self, Self::Disbursed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Stage {
    type Error = ParseStageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|stage| {
                stage.as_str().eq_ignore_ascii_case(normalized)
                    || stage.label().eq_ignore_ascii_case(normalized)
            })
            .ok_or_else(|| ParseStageError(value.to_owned()))
    }
}
