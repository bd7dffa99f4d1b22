//! Service layer for lead status transitions, edits and deletion.
//!
//! Setting the qualifying status runs two writes: the status write, then
//! the insert of a new application. The second write is not transactional
//! with the first, so its failure is reported as
//! [`LeadLifecycleError::ApplicationSpawn`], separately from a failed
//! status write.

use super::intake::RowRejection;
use crate::application::{
    domain::Application,
    ports::{ApplicationRepository, ApplicationRepositoryError},
};
use crate::lead::{
    domain::{
        Lead, LeadAmount, LeadDomainError, LeadId, LeadPage, LeadQuery, LeadStatus,
        ParseLeadStatusError,
    },
    ports::{LeadNoteRepository, LeadRepository, LeadRepositoryError},
};
use crate::notice::Notice;
use crate::session::{Session, UserId};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for changing a lead's working status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateLeadStatusRequest {
    lead_id: LeadId,
    status: String,
}

impl UpdateLeadStatusRequest {
    /// Creates a request setting `status` on `lead_id`.
    #[must_use]
    pub fn new(lead_id: LeadId, status: impl Into<String>) -> Self {
        Self {
            lead_id,
            status: status.into(),
        }
    }
}

/// Request payload for editing the free-form fields of a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLeadRequest {
    lead_id: LeadId,
    name: Option<String>,
    amount: Option<u64>,
}

impl EditLeadRequest {
    /// Creates an edit that clears the name and amount.
    #[must_use]
    pub const fn new(lead_id: LeadId) -> Self {
        Self {
            lead_id,
            name: None,
            amount: None,
        }
    }

    /// Sets the borrower name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the requested amount, checked against the lending range.
    #[must_use]
    pub const fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Result of a committed status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdateOutcome {
    /// The lead after the status write.
    pub lead: Lead,
    /// The application spawned by a qualifying status, if any.
    pub spawned: Option<Application>,
}

impl StatusUpdateOutcome {
    /// Returns the success notice for this outcome.
    #[must_use]
    pub fn notice(&self) -> Notice {
        if self.spawned.is_some() {
            Notice::success("Status updated and loan application created")
        } else {
            Notice::success("Status updated")
        }
    }
}

/// Failure of the application insert that follows a qualifying status.
#[derive(Debug, Clone, Error)]
pub enum SpawnError {
    /// Re-reading the lead after the status write failed.
    #[error("could not re-read lead: {0}")]
    LeadRead(#[source] LeadRepositoryError),
    /// The lead vanished between the status write and the re-read.
    #[error("lead no longer exists")]
    LeadMissing,
    /// Storing the application failed.
    #[error("could not store application: {0}")]
    Store(#[source] ApplicationRepositoryError),
}

/// Service-level errors for lead operations.
#[derive(Debug, Error)]
pub enum LeadLifecycleError {
    /// The status is not part of the taxonomy.
    #[error(transparent)]
    InvalidStatus(#[from] ParseLeadStatusError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] LeadDomainError),
    /// One or more intake rows were rejected; nothing was stored.
    #[error("{} row(s) rejected, nothing was imported", .0.len())]
    Rejected(Vec<RowRejection>),
    /// The operation is reserved for administrators.
    #[error("only administrators may {0}")]
    Forbidden(&'static str),
    /// The lead does not exist or is not visible to the session.
    #[error("lead not found: {0}")]
    NotFound(LeadId),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] LeadRepositoryError),
    /// The status write committed but the application was not created.
    #[error("status of lead {lead_id} updated to '{status}', but application creation failed: {source}")]
    ApplicationSpawn {
        /// The lead whose status changed.
        lead_id: LeadId,
        /// The committed status.
        status: LeadStatus,
        /// Why the application insert failed.
        #[source]
        source: SpawnError,
    },
}

impl LeadLifecycleError {
    /// Returns `true` when the request was rejected before any write.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatus(_) | Self::Domain(_) | Self::Rejected(_)
        )
    }

    /// Returns the notice describing this error.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::ApplicationSpawn { status, .. } => Notice::partial_failure(format!(
                "Status updated to '{status}', but the loan application could not be created"
            )),
            _ if self.is_validation() => Notice::validation(self.to_string()),
            _ => Notice::remote_failure(format!("Could not update lead: {self}")),
        }
    }
}

/// Result type for lead service operations.
pub type LeadLifecycleResult<T> = Result<T, LeadLifecycleError>;

/// Lead orchestration service.
///
/// `R` stores leads and their notes; `A` receives applications spawned by
/// qualifying status changes.
#[derive(Clone)]
pub struct LeadLifecycleService<R, A, C>
where
    R: LeadRepository + LeadNoteRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    pub(super) leads: Arc<R>,
    applications: Arc<A>,
    pub(super) clock: Arc<C>,
}

impl<R, A, C> LeadLifecycleService<R, A, C>
where
    R: LeadRepository + LeadNoteRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new lead lifecycle service.
    #[must_use]
    pub const fn new(leads: Arc<R>, applications: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            leads,
            applications,
            clock,
        }
    }

    /// Sets a lead's working status and, for the qualifying status, spawns a
    /// loan application.
    ///
    /// The status and derived final status are written together. When the
    /// new status qualifies, the lead is re-read after that write commits
    /// and a new application is stored in Under Review with the lead's
    /// amount and agent. Every qualifying write spawns a new application.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::InvalidStatus`] before any write for a
    /// status outside the taxonomy, [`LeadLifecycleError::NotFound`] or
    /// [`LeadLifecycleError::Repository`] when the status write fails, and
    /// [`LeadLifecycleError::ApplicationSpawn`] when the status committed but
    /// the application insert failed.
    pub async fn update_status(
        &self,
        session: &Session,
        request: UpdateLeadStatusRequest,
    ) -> LeadLifecycleResult<StatusUpdateOutcome> {
        let status = LeadStatus::try_from(request.status.as_str())?;
        let mut lead = self.find_visible(session, request.lead_id).await?;

        let change = lead.set_status(status, &*self.clock);
        self.leads.update_status(lead.id(), &change).await?;
        info!(
            lead_id = %lead.id(),
            status = %status,
            final_status = %change.final_status(),
            "lead status updated"
        );

        if !status.is_qualifying() {
            return Ok(StatusUpdateOutcome {
                lead,
                spawned: None,
            });
        }

        match self.spawn_application(lead.id()).await {
            Ok(application) => Ok(StatusUpdateOutcome {
                lead,
                spawned: Some(application),
            }),
            Err(source) => {
                warn!(lead_id = %lead.id(), error = %source, "application spawn failed after status write");
                Err(LeadLifecycleError::ApplicationSpawn {
                    lead_id: lead.id(),
                    status,
                    source,
                })
            }
        }
    }

    async fn spawn_application(&self, lead_id: LeadId) -> Result<Application, SpawnError> {
        let lead = self
            .leads
            .find_by_id(lead_id)
            .await
            .map_err(SpawnError::LeadRead)?
            .ok_or(SpawnError::LeadMissing)?;
        let application = Application::spawn_from_lead(&lead, &*self.clock);
        self.applications
            .store(&application)
            .await
            .map_err(SpawnError::Store)?;
        info!(
            lead_id = %lead_id,
            application_id = %application.id(),
            loan_amount = application.loan_amount().value(),
            "loan application spawned"
        );
        Ok(application)
    }

    /// Replaces a lead's name and requested amount.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Domain`] for an amount outside the
    /// lending range, and [`LeadLifecycleError::NotFound`] or
    /// [`LeadLifecycleError::Repository`] when the lookup or write fails.
    pub async fn edit_details(
        &self,
        session: &Session,
        request: EditLeadRequest,
    ) -> LeadLifecycleResult<Lead> {
        let amount = request.amount.map(LeadAmount::new).transpose()?;
        let mut lead = self.find_visible(session, request.lead_id).await?;
        lead.rename(request.name, &*self.clock);
        lead.change_amount(amount, &*self.clock);
        self.leads.update_details(&lead).await?;
        info!(lead_id = %lead.id(), "lead details updated");
        Ok(lead)
    }

    /// Assigns every listed lead to `agent_id`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Forbidden`] for agent sessions and
    /// [`LeadLifecycleError::Repository`] when a lead is missing or the
    /// write fails; no lead is reassigned in either case.
    pub async fn assign_agent(
        &self,
        session: &Session,
        lead_ids: &[LeadId],
        agent_id: UserId,
    ) -> LeadLifecycleResult<()> {
        require_admin(session, "assign leads")?;
        if lead_ids.is_empty() {
            return Ok(());
        }
        self.leads
            .assign_agent(lead_ids, agent_id, self.clock.utc())
            .await?;
        info!(count = lead_ids.len(), agent_id = %agent_id, "leads assigned");
        Ok(())
    }

    /// Deletes every listed lead together with its notes and applications.
    ///
    /// Deletion is all or nothing: if any lead is missing, nothing is
    /// deleted. Returns the number of leads removed.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Forbidden`] for agent sessions and
    /// [`LeadLifecycleError::Repository`] when a lead is missing or the
    /// delete fails.
    pub async fn delete_leads(
        &self,
        session: &Session,
        lead_ids: &[LeadId],
    ) -> LeadLifecycleResult<u64> {
        require_admin(session, "delete leads")?;
        if lead_ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.leads.delete_many(lead_ids).await?;
        info!(deleted, "leads deleted");
        Ok(deleted)
    }

    /// Returns one page of the leads visible to the session.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Repository`] when the read fails.
    pub async fn search(
        &self,
        session: &Session,
        query: LeadQuery,
    ) -> LeadLifecycleResult<LeadPage> {
        let LeadQuery {
            filter,
            ordering,
            page,
        } = query;
        let scoped = LeadQuery {
            filter: filter.scoped_to(session),
            ordering,
            page,
        };
        Ok(self.leads.list(&scoped).await?)
    }

    /// Retrieves a lead visible to the session.
    ///
    /// Returns `Ok(None)` when it does not exist or belongs to another agent.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Repository`] when the read fails.
    pub async fn find(&self, session: &Session, lead_id: LeadId) -> LeadLifecycleResult<Option<Lead>> {
        let found = self.leads.find_by_id(lead_id).await?;
        Ok(found.filter(|lead| session.can_see(lead.agent_id())))
    }

    pub(super) async fn find_visible(
        &self,
        session: &Session,
        lead_id: LeadId,
    ) -> LeadLifecycleResult<Lead> {
        self.find(session, lead_id)
            .await?
            .ok_or(LeadLifecycleError::NotFound(lead_id))
    }
}

pub(super) fn require_admin(
    session: &Session,
    action: &'static str,
) -> LeadLifecycleResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(LeadLifecycleError::Forbidden(action))
    }
}
