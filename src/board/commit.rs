//! Remote half of a board move.

use crate::application::{
    domain::{ApplicationId, StageChange},
    ports::{ApplicationRepository, ApplicationRepositoryResult},
};
use std::sync::Arc;

/// A stage change already applied to the board cache and awaiting its
/// remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageCommit {
    /// The moved application.
    pub application_id: ApplicationId,
    /// The change applied optimistically.
    pub change: StageChange,
}

/// Result of writing a [`StageCommit`].
#[derive(Debug, Clone)]
pub struct CommitReport {
    /// The commit that was written.
    pub commit: StageCommit,
    /// Outcome of the remote write.
    pub result: ApplicationRepositoryResult<()>,
}

/// Writes stage commits to the application store.
pub struct StageCommitter<A> {
    applications: Arc<A>,
}

impl<A> Clone for StageCommitter<A> {
    fn clone(&self) -> Self {
        Self {
            applications: Arc::clone(&self.applications),
        }
    }
}

impl<A: ApplicationRepository> StageCommitter<A> {
    /// Creates a committer over the application store.
    #[must_use]
    pub const fn new(applications: Arc<A>) -> Self {
        Self { applications }
    }

    /// Writes one commit and reports the outcome. Never retries.
    pub async fn commit(&self, commit: StageCommit) -> CommitReport {
        let result = self
            .applications
            .update_stage(commit.application_id, &commit.change)
            .await;
        CommitReport { commit, result }
    }
}
