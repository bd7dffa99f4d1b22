//! Lead aggregate root and the atomic status change it produces.

use super::{AppNo, FinalStatus, LeadAmount, LeadId, LeadStatus, MobileNumber, derive_final_status};
use crate::session::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated fields of a lead about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    /// Business key.
    pub app_no: AppNo,
    /// Borrower name, if known.
    pub name: Option<String>,
    /// Borrower mobile number.
    pub mobile_no: MobileNumber,
    /// Requested amount, if known.
    pub amount: Option<LeadAmount>,
}

/// Lead aggregate root.
///
/// `final_status` is never stored independently: it is derived from
/// `status` on construction and on every status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    id: LeadId,
    app_no: AppNo,
    name: Option<String>,
    mobile_no: MobileNumber,
    amount: Option<LeadAmount>,
    status: Option<LeadStatus>,
    final_status: FinalStatus,
    agent_id: Option<UserId>,
    created_at: DateTime<Utc>,
    uploaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLeadData {
    /// Persisted lead identifier.
    pub id: LeadId,
    /// Persisted business key.
    pub app_no: AppNo,
    /// Persisted borrower name.
    pub name: Option<String>,
    /// Persisted mobile number.
    pub mobile_no: MobileNumber,
    /// Persisted requested amount.
    pub amount: Option<LeadAmount>,
    /// Persisted working status.
    pub status: Option<LeadStatus>,
    /// Persisted assigned agent.
    pub agent_id: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A status write that must be persisted as one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    status: LeadStatus,
    final_status: FinalStatus,
    changed_at: DateTime<Utc>,
}

impl StatusChange {
    /// Creates a change for `status`, deriving the matching final status.
    #[must_use]
    pub fn new(status: LeadStatus, changed_at: DateTime<Utc>) -> Self {
        Self {
            status,
            final_status: derive_final_status(Some(status)),
            changed_at,
        }
    }

    /// Returns the new working status.
    #[must_use]
    pub const fn status(&self) -> LeadStatus {
        self.status
    }

    /// Returns the derived final status.
    #[must_use]
    pub const fn final_status(&self) -> FinalStatus {
        self.final_status
    }

    /// Returns the time of the change.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

/// Borrower details shown alongside an application card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSummary {
    /// Borrower name, if known.
    pub name: Option<String>,
    /// Borrower mobile number.
    pub mobile_no: MobileNumber,
}

impl Lead {
    /// Creates a new lead assigned to `agent_id`, with no working status.
    #[must_use]
    pub fn new(new_lead: NewLead, agent_id: UserId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        let NewLead {
            app_no,
            name,
            mobile_no,
            amount,
        } = new_lead;

        Self {
            id: LeadId::new(),
            app_no,
            name: normalize_name(name),
            mobile_no,
            amount,
            status: None,
            final_status: derive_final_status(None),
            agent_id: Some(agent_id),
            created_at: timestamp,
            uploaded_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a lead from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLeadData) -> Self {
        Self {
            id: data.id,
            app_no: data.app_no,
            name: data.name,
            mobile_no: data.mobile_no,
            amount: data.amount,
            status: data.status,
            final_status: derive_final_status(data.status),
            agent_id: data.agent_id,
            created_at: data.created_at,
            uploaded_at: data.uploaded_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the lead identifier.
    #[must_use]
    pub const fn id(&self) -> LeadId {
        self.id
    }

    /// Returns the business key.
    #[must_use]
    pub const fn app_no(&self) -> &AppNo {
        &self.app_no
    }

    /// Returns the borrower name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the borrower mobile number.
    #[must_use]
    pub const fn mobile_no(&self) -> &MobileNumber {
        &self.mobile_no
    }

    /// Returns the requested amount.
    #[must_use]
    pub const fn amount(&self) -> Option<LeadAmount> {
        self.amount
    }

    /// Returns the working status.
    #[must_use]
    pub const fn status(&self) -> Option<LeadStatus> {
        self.status
    }

    /// Returns the derived final status.
    #[must_use]
    pub const fn final_status(&self) -> FinalStatus {
        self.final_status
    }

    /// Returns `true` while the lead is still being worked.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.final_status, FinalStatus::Open)
    }

    /// Returns the assigned agent.
    #[must_use]
    pub const fn agent_id(&self) -> Option<UserId> {
        self.agent_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the upload timestamp.
    #[must_use]
    pub const fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the borrower details shown on application cards.
    #[must_use]
    pub fn summary(&self) -> LeadSummary {
        LeadSummary {
            name: self.name.clone(),
            mobile_no: self.mobile_no.clone(),
        }
    }

    /// Sets the working status and re-derives the final status.
    ///
    /// The returned [`StatusChange`] carries both values and must be
    /// persisted as a single write.
    pub fn set_status(&mut self, status: LeadStatus, clock: &impl Clock) -> StatusChange {
        let change = StatusChange::new(status, clock.utc());
        self.apply_status_change(&change);
        change
    }

    /// Applies a status change produced elsewhere, keeping both fields in step.
    pub fn apply_status_change(&mut self, change: &StatusChange) {
        self.status = Some(change.status);
        self.final_status = change.final_status;
        self.updated_at = change.changed_at;
    }

    /// Replaces the borrower name. Blank names clear it.
    pub fn rename(&mut self, name: Option<String>, clock: &impl Clock) {
        self.name = normalize_name(name);
        self.touch(clock);
    }

    /// Replaces the requested amount.
    pub fn change_amount(&mut self, amount: Option<LeadAmount>, clock: &impl Clock) {
        self.amount = amount;
        self.touch(clock);
    }

    /// Assigns the lead to an agent.
    pub const fn assign_to(&mut self, agent_id: UserId, assigned_at: DateTime<Utc>) {
        self.agent_id = Some(agent_id);
        self.updated_at = assigned_at;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
