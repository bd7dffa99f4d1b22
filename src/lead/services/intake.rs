//! Lead intake: manual entry and bulk import of pre-parsed rows.
//!
//! Both paths validate every row, reject duplicates within the batch and
//! against stored leads, and then go through the same all-or-nothing
//! `store_many` write.

use super::lifecycle::{LeadLifecycleError, LeadLifecycleResult, LeadLifecycleService, require_admin};
use crate::application::ports::ApplicationRepository;
use crate::lead::{
    domain::{AppNo, Lead, LeadAmount, LeadDomainError, MobileNumber, NewLead},
    ports::{LeadNoteRepository, LeadRepository},
};
use crate::session::{Session, UserId};
use mockable::Clock;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Unvalidated lead fields, as entered in the form or parsed from an
/// import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadDraft {
    app_no: String,
    name: Option<String>,
    mobile_no: String,
    amount: Option<u64>,
}

impl LeadDraft {
    /// Creates a draft with the required fields.
    #[must_use]
    pub fn new(app_no: impl Into<String>, mobile_no: impl Into<String>) -> Self {
        Self {
            app_no: app_no.into(),
            name: None,
            mobile_no: mobile_no.into(),
            amount: None,
        }
    }

    /// Sets the borrower name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the requested amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Returns the raw application number.
    #[must_use]
    pub fn app_no(&self) -> &str {
        &self.app_no
    }

    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`LeadDomainError`] found: blank application
    /// number, malformed mobile number or out-of-range amount.
    pub fn validate(&self) -> Result<NewLead, LeadDomainError> {
        Ok(NewLead {
            app_no: AppNo::new(self.app_no.as_str())?,
            name: self.name.clone(),
            mobile_no: MobileNumber::new(self.mobile_no.as_str())?,
            amount: self.amount.map(LeadAmount::new).transpose()?,
        })
    }
}

/// The business key a duplicate collided on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateKey {
    /// Application number.
    AppNo(AppNo),
    /// Mobile number.
    Mobile(MobileNumber),
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AppNo(app_no) => write!(f, "application number {app_no}"),
            Self::Mobile(mobile) => write!(f, "mobile number {mobile}"),
        }
    }
}

/// Why an intake row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// A field failed validation.
    #[error(transparent)]
    Invalid(LeadDomainError),
    /// An earlier row in the same batch has the same key.
    #[error("duplicate {0} within the batch")]
    DuplicateInBatch(DuplicateKey),
    /// A stored lead already has the same key.
    #[error("{0} already exists")]
    AlreadyExists(DuplicateKey),
}

/// One rejected intake row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// One-based position of the row in the batch.
    pub line: usize,
    /// Application number as supplied.
    pub app_no: String,
    /// Why the row was rejected.
    pub reason: RejectionReason,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} ({}): {}", self.line, self.app_no, self.reason)
    }
}

impl<R, A, C> LeadLifecycleService<R, A, C>
where
    R: LeadRepository + LeadNoteRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a single lead assigned to `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Forbidden`] for agent sessions,
    /// [`LeadLifecycleError::Domain`] for invalid fields,
    /// [`LeadLifecycleError::Rejected`] when the application or mobile
    /// number already exists, and [`LeadLifecycleError::Repository`] when
    /// the write fails.
    pub async fn create_lead(
        &self,
        session: &Session,
        draft: LeadDraft,
        agent_id: UserId,
    ) -> LeadLifecycleResult<Lead> {
        require_admin(session, "create leads")?;
        draft.validate()?;
        let mut stored = self.insert(vec![draft], agent_id).await?;
        stored
            .pop()
            .ok_or(LeadLifecycleError::Rejected(Vec::new()))
    }

    /// Imports a batch of rows assigned to `agent_id`, all or nothing.
    ///
    /// Every row is checked before anything is written; if any row is
    /// rejected, the error lists all rejections and no lead is stored.
    ///
    /// # Errors
    ///
    /// Returns [`LeadLifecycleError::Forbidden`] for agent sessions,
    /// [`LeadLifecycleError::Rejected`] when any row fails validation or
    /// de-duplication, and [`LeadLifecycleError::Repository`] when the
    /// write fails.
    pub async fn import_leads(
        &self,
        session: &Session,
        rows: Vec<LeadDraft>,
        agent_id: UserId,
    ) -> LeadLifecycleResult<Vec<Lead>> {
        require_admin(session, "import leads")?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.insert(rows, agent_id).await
    }

    async fn insert(&self, rows: Vec<LeadDraft>, agent_id: UserId) -> LeadLifecycleResult<Vec<Lead>> {
        let accepted = self.screen(&rows).await?;
        let leads: Vec<Lead> = accepted
            .into_iter()
            .map(|new_lead| Lead::new(new_lead, agent_id, &*self.clock))
            .collect();
        self.leads.store_many(&leads).await?;
        info!(count = leads.len(), agent_id = %agent_id, "leads created");
        Ok(leads)
    }

    async fn screen(&self, rows: &[LeadDraft]) -> LeadLifecycleResult<Vec<NewLead>> {
        let mut rejections = Vec::new();
        let mut accepted: Vec<(usize, NewLead)> = Vec::with_capacity(rows.len());
        let mut seen_app_nos = HashSet::new();
        let mut seen_mobiles = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            let line = index.saturating_add(1);
            let reject = |reason| RowRejection {
                line,
                app_no: row.app_no.clone(),
                reason,
            };
            match row.validate() {
                Err(err) => rejections.push(reject(RejectionReason::Invalid(err))),
                Ok(new_lead) if !seen_app_nos.insert(new_lead.app_no.clone()) => rejections.push(
                    reject(RejectionReason::DuplicateInBatch(DuplicateKey::AppNo(new_lead.app_no))),
                ),
                Ok(new_lead) if !seen_mobiles.insert(new_lead.mobile_no.clone()) => rejections.push(
                    reject(RejectionReason::DuplicateInBatch(DuplicateKey::Mobile(
                        new_lead.mobile_no,
                    ))),
                ),
                Ok(new_lead) => accepted.push((line, new_lead)),
            }
        }

        if !accepted.is_empty() {
            rejections.extend(self.existing_conflicts(&accepted).await?);
        }

        if rejections.is_empty() {
            Ok(accepted.into_iter().map(|(_, new_lead)| new_lead).collect())
        } else {
            rejections.sort_by_key(|rejection| rejection.line);
            Err(LeadLifecycleError::Rejected(rejections))
        }
    }

    async fn existing_conflicts(
        &self,
        accepted: &[(usize, NewLead)],
    ) -> LeadLifecycleResult<Vec<RowRejection>> {
        let app_nos: Vec<AppNo> = accepted
            .iter()
            .map(|(_, new_lead)| new_lead.app_no.clone())
            .collect();
        let mobiles: Vec<MobileNumber> = accepted
            .iter()
            .map(|(_, new_lead)| new_lead.mobile_no.clone())
            .collect();
        let existing = self.leads.find_conflicts(&app_nos, &mobiles).await?;
        let taken_app_nos: HashSet<&AppNo> = existing.iter().map(Lead::app_no).collect();
        let taken_mobiles: HashSet<&MobileNumber> = existing.iter().map(Lead::mobile_no).collect();

        Ok(accepted
            .iter()
            .filter_map(|(line, new_lead)| {
                let key = if taken_app_nos.contains(&new_lead.app_no) {
                    DuplicateKey::AppNo(new_lead.app_no.clone())
                } else if taken_mobiles.contains(&new_lead.mobile_no) {
                    DuplicateKey::Mobile(new_lead.mobile_no.clone())
                } else {
                    return None;
                };
                Some(RowRejection {
                    line: *line,
                    app_no: new_lead.app_no.to_string(),
                    reason: RejectionReason::AlreadyExists(key),
                })
            })
            .collect())
    }
}
