//! Repository ports for leads and lead notes.

use crate::lead::domain::{
    AppNo, Lead, LeadId, LeadNote, LeadPage, LeadQuery, MobileNumber, StatusChange,
};
use crate::session::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for lead repository operations.
pub type LeadRepositoryResult<T> = Result<T, LeadRepositoryError>;

/// Lead persistence contract.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Stores new leads as one unit: either every lead is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::DuplicateAppNo`] or
    /// [`LeadRepositoryError::DuplicateMobile`] when a business key already
    /// exists, and [`LeadRepositoryError::DuplicateLead`] for a repeated ID.
    async fn store_many(&self, leads: &[Lead]) -> LeadRepositoryResult<()>;

    /// Finds a lead by identifier.
    ///
    /// Returns `None` when the lead does not exist.
    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>>;

    /// Returns every stored lead whose application number or mobile number
    /// appears in the given lists.
    async fn find_conflicts(
        &self,
        app_nos: &[AppNo],
        mobiles: &[MobileNumber],
    ) -> LeadRepositoryResult<Vec<Lead>>;

    /// Returns one page of leads matching the query, with the total count.
    async fn list(&self, query: &LeadQuery) -> LeadRepositoryResult<LeadPage>;

    /// Writes a status change: status, final status and update time in a
    /// single statement.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] when the lead does not exist.
    async fn update_status(&self, id: LeadId, change: &StatusChange) -> LeadRepositoryResult<()>;

    /// Persists the free-form fields of a lead (name, amount and update
    /// time). Status and agent are never written by this call; use
    /// [`Self::assign_agent`] to reassign.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] when the lead does not exist.
    async fn update_details(&self, lead: &Lead) -> LeadRepositoryResult<()>;

    /// Assigns every listed lead to `agent_id`, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] naming the first missing
    /// lead; no lead is reassigned in that case.
    async fn assign_agent(
        &self,
        ids: &[LeadId],
        agent_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<()>;

    /// Deletes every listed lead together with its notes and applications,
    /// all or nothing. Returns the number of leads deleted.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] naming the first missing
    /// lead; nothing is deleted in that case.
    async fn delete_many(&self, ids: &[LeadId]) -> LeadRepositoryResult<u64>;
}

/// Append-only note persistence contract.
#[async_trait]
pub trait LeadNoteRepository: Send + Sync {
    /// Stores a new note.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] when the owning lead does
    /// not exist.
    async fn append(&self, note: &LeadNote) -> LeadRepositoryResult<()>;

    /// Returns the notes of a lead, newest first.
    async fn list_for_lead(&self, lead_id: LeadId) -> LeadRepositoryResult<Vec<LeadNote>>;
}

/// Errors returned by lead repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LeadRepositoryError {
    /// A lead with the same identifier already exists.
    #[error("duplicate lead identifier: {0}")]
    DuplicateLead(LeadId),

    /// A lead with the same application number already exists.
    #[error("duplicate application number: {0}")]
    DuplicateAppNo(AppNo),

    /// A lead with the same mobile number already exists.
    #[error("duplicate mobile number: {0}")]
    DuplicateMobile(MobileNumber),

    /// The lead was not found.
    #[error("lead not found: {0}")]
    NotFound(LeadId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LeadRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
