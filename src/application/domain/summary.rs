//! Per-stage aggregates shown in board column headers.

use super::{Application, Stage};
use crate::money::Rupees;

/// Count and total amount of the applications in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    /// The stage summarised.
    pub stage: Stage,
    /// Number of applications in the stage.
    pub count: usize,
    /// Sum of board amounts: disbursed amounts for Disbursed, loan amounts
    /// elsewhere. Missing amounts count as zero.
    pub total_amount: Rupees,
}

/// Aggregates for every stage, in board column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSummary {
    stages: Vec<StageSummary>,
}

impl BoardSummary {
    /// Computes the summary for a set of applications.
    ///
    /// Every stage is present in the result, including empty ones.
    pub fn compute<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut stages: Vec<StageSummary> = Stage::ALL
            .into_iter()
            .map(|stage| StageSummary {
                stage,
                count: 0,
                total_amount: Rupees::ZERO,
            })
            .collect();

        for application in applications {
            if let Some(entry) = stages
                .iter_mut()
                .find(|entry| entry.stage == application.stage())
            {
                entry.count = entry.count.saturating_add(1);
                entry.total_amount = entry.total_amount.saturating_add(application.board_amount());
            }
        }

        Self { stages }
    }

    /// Returns the per-stage entries in column order.
    #[must_use]
    pub fn stages(&self) -> &[StageSummary] {
        &self.stages
    }

    /// Returns the summary of one stage.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> StageSummary {
        self.stages
            .iter()
            .find(|entry| entry.stage == stage)
            .copied()
            .unwrap_or(StageSummary {
                stage,
                count: 0,
                total_amount: Rupees::ZERO,
            })
    }

    /// Returns the number of applications in `stage`.
    #[must_use]
    pub fn count(&self, stage: Stage) -> usize {
        self.stage(stage).count
    }

    /// Returns the total board amount of `stage`.
    #[must_use]
    pub fn total_amount(&self, stage: Stage) -> Rupees {
        self.stage(stage).total_amount
    }
}
