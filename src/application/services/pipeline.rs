//! Service layer for moving applications through the pipeline.

use crate::application::{
    domain::{
        Application, ApplicationCard, ApplicationEdit, ApplicationFilter, ApplicationId,
        DisbursedAmount, InterestRate, ParseStageError, PipelineDomainError, Stage, StageChange,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError},
};
use crate::money::Rupees;
use crate::notice::Notice;
use crate::session::Session;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for moving an application to another stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionApplicationRequest {
    application_id: ApplicationId,
    target_stage: String,
    disbursed_amount: Option<String>,
}

impl TransitionApplicationRequest {
    /// Creates a request to move `application_id` to `target_stage`.
    #[must_use]
    pub fn new(application_id: ApplicationId, target_stage: impl Into<String>) -> Self {
        Self {
            application_id,
            target_stage: target_stage.into(),
            disbursed_amount: None,
        }
    }

    /// Supplies the disbursed amount required to enter Disbursed.
    #[must_use]
    pub fn with_disbursed_amount(mut self, amount: impl Into<String>) -> Self {
        self.disbursed_amount = Some(amount.into());
        self
    }
}

/// Request payload for editing the detail fields of an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditApplicationRequest {
    application_id: ApplicationId,
    loan_amount: u64,
    interest_rate: Option<String>,
    tenure_months: Option<u32>,
    monthly_emi: Option<u64>,
    notes: Option<String>,
}

impl EditApplicationRequest {
    /// Creates an edit setting the loan amount and clearing every optional
    /// field.
    #[must_use]
    pub const fn new(application_id: ApplicationId, loan_amount: u64) -> Self {
        Self {
            application_id,
            loan_amount,
            interest_rate: None,
            tenure_months: None,
            monthly_emi: None,
            notes: None,
        }
    }

    /// Sets the interest rate, e.g. `10.5`.
    #[must_use]
    pub fn with_interest_rate(mut self, rate: impl Into<String>) -> Self {
        self.interest_rate = Some(rate.into());
        self
    }

    /// Sets the tenure in months.
    #[must_use]
    pub const fn with_tenure_months(mut self, months: u32) -> Self {
        self.tenure_months = Some(months);
        self
    }

    /// Sets the monthly instalment.
    #[must_use]
    pub const fn with_monthly_emi(mut self, emi: u64) -> Self {
        self.monthly_emi = Some(emi);
        self
    }

    /// Sets the free-text notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The target equalled the current stage; nothing was written.
    Unchanged(Application),
    /// The change was committed.
    Moved {
        /// The application after the change.
        application: Application,
        /// The committed change.
        change: StageChange,
    },
}

impl TransitionOutcome {
    /// Returns the application after the request.
    #[must_use]
    pub const fn application(&self) -> &Application {
        match self {
            Self::Unchanged(application) | Self::Moved { application, .. } => application,
        }
    }

    /// Returns the success notice for a committed move, or `None` for a
    /// no-op.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Unchanged(_) => None,
            Self::Moved { change, .. } => Some(Notice::success(format!(
                "Application moved to {}",
                change.to().label()
            ))),
        }
    }
}

/// Service-level errors for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The requested stage is not one of the four pipeline stages.
    #[error(transparent)]
    InvalidStage(#[from] ParseStageError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] PipelineDomainError),
    /// The application does not exist or is not visible to the session.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ApplicationRepositoryError),
}

impl PipelineError {
    /// Returns `true` when the request was rejected before any write.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidStage(_) | Self::Domain(_))
    }

    /// Returns the notice describing this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        if self.is_validation() {
            Notice::validation(self.to_string())
        } else {
            Notice::remote_failure(format!("Could not update application: {self}"))
        }
    }
}

/// Result type for pipeline service operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline orchestration service.
#[derive(Clone)]
pub struct PipelineService<A, C>
where
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    applications: Arc<A>,
    clock: Arc<C>,
}

impl<A, C> PipelineService<A, C>
where
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new pipeline service.
    #[must_use]
    pub const fn new(applications: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            applications,
            clock,
        }
    }

    /// Moves an application to another stage.
    ///
    /// Moving to the current stage is a no-op: nothing is written and the
    /// outcome carries no notice.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidStage`] or [`PipelineError::Domain`]
    /// for rejected input (including Disbursed without an amount), in which
    /// case no write is attempted. Returns [`PipelineError::NotFound`] or
    /// [`PipelineError::Repository`] when the store lookup or write fails.
    pub async fn transition(
        &self,
        session: &Session,
        request: TransitionApplicationRequest,
    ) -> PipelineResult<TransitionOutcome> {
        let TransitionApplicationRequest {
            application_id,
            target_stage,
            disbursed_amount,
        } = request;
        let target = Stage::try_from(target_stage.as_str())?;
        let amount = disbursed_amount
            .as_deref()
            .map(DisbursedAmount::parse)
            .transpose()?;

        let mut application = self.find_visible(session, application_id).await?;
        let Some(change) = application.plan_transition(target, amount, self.clock.utc())? else {
            debug!(application_id = %application_id, stage = %target, "stage unchanged");
            return Ok(TransitionOutcome::Unchanged(application));
        };

        self.applications
            .update_stage(application_id, &change)
            .await?;
        application.apply_change(&change);
        info!(
            application_id = %application_id,
            from = %change.from(),
            to = %change.to(),
            "application stage changed"
        );
        Ok(TransitionOutcome::Moved {
            application,
            change,
        })
    }

    /// Replaces the free-form detail fields of an application.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Domain`] for a malformed interest rate,
    /// [`PipelineError::NotFound`] for an unknown or invisible application
    /// and [`PipelineError::Repository`] when the write fails.
    pub async fn edit_details(
        &self,
        session: &Session,
        request: EditApplicationRequest,
    ) -> PipelineResult<Application> {
        let interest_rate = request
            .interest_rate
            .as_deref()
            .map(InterestRate::try_from)
            .transpose()?;
        let edit = ApplicationEdit {
            loan_amount: Rupees::new(request.loan_amount),
            interest_rate,
            tenure_months: request.tenure_months,
            monthly_emi: request.monthly_emi.map(Rupees::new),
            notes: request.notes,
        };

        let mut application = self.find_visible(session, request.application_id).await?;
        application.edit(edit, &*self.clock);
        self.applications.update_details(&application).await?;
        info!(application_id = %application.id(), "application details updated");
        Ok(application)
    }

    /// Lists the cards visible to the session, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Repository`] when the read fails.
    pub async fn list_cards(
        &self,
        session: &Session,
        filter: ApplicationFilter,
    ) -> PipelineResult<Vec<ApplicationCard>> {
        let scoped = filter.scoped_to(session);
        Ok(self.applications.list(&scoped).await?)
    }

    /// Retrieves an application visible to the session.
    ///
    /// Returns `Ok(None)` when it does not exist or belongs to another agent.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Repository`] when the read fails.
    pub async fn find(
        &self,
        session: &Session,
        id: ApplicationId,
    ) -> PipelineResult<Option<Application>> {
        let found = self.applications.find_by_id(id).await?;
        Ok(found.filter(|application| session.can_see(application.agent_id())))
    }

    async fn find_visible(
        &self,
        session: &Session,
        id: ApplicationId,
    ) -> PipelineResult<Application> {
        self.find(session, id)
            .await?
            .ok_or(PipelineError::NotFound(id))
    }
}
