//! Repository port for loan applications.

use crate::application::domain::{
    Application, ApplicationCard, ApplicationFilter, ApplicationId, StageChange,
};
use crate::lead::domain::LeadId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for application repository operations.
pub type ApplicationRepositoryResult<T> = Result<T, ApplicationRepositoryError>;

/// Application persistence contract.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores a newly spawned application.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::DuplicateApplication`] for a
    /// repeated identifier and [`ApplicationRepositoryError::LeadNotFound`]
    /// when the owning lead does not exist.
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>>;

    /// Lists applications matching `filter`, joined with their lead's
    /// borrower details, newest first.
    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> ApplicationRepositoryResult<Vec<ApplicationCard>>;

    /// Writes a stage change: stage, update time and, when entering
    /// Disbursed, the disbursement fields, in a single statement.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::NotFound`] when the application
    /// does not exist.
    async fn update_stage(
        &self,
        id: ApplicationId,
        change: &StageChange,
    ) -> ApplicationRepositoryResult<()>;

    /// Persists the free-form detail fields. Stage and disbursement fields
    /// are never written by this call.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::NotFound`] when the application
    /// does not exist.
    async fn update_details(&self, application: &Application) -> ApplicationRepositoryResult<()>;
}

/// Errors returned by application repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ApplicationRepositoryError {
    /// An application with the same identifier already exists.
    #[error("duplicate application identifier: {0}")]
    DuplicateApplication(ApplicationId),

    /// The owning lead does not exist.
    #[error("lead not found for application: {0}")]
    LeadNotFound(LeadId),

    /// The application was not found.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApplicationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
