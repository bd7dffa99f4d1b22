//! Diesel row models for lead and application persistence.

use super::schema::{applications, lead_notes, leads};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Row of the `leads` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeadRow {
    /// Internal lead identifier.
    pub id: Uuid,
    /// Business key.
    pub app_no: String,
    /// Borrower name.
    pub name: Option<String>,
    /// Mobile number.
    pub mobile_no: String,
    /// Requested amount.
    pub amount: Option<i64>,
    /// Working status.
    pub status: Option<String>,
    /// Derived final status.
    pub final_status: String,
    /// Assigned agent.
    pub agent_id: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row of the `lead_notes` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = lead_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeadNoteRow {
    /// Internal note identifier.
    pub id: Uuid,
    /// Owning lead.
    pub lead_id: Uuid,
    /// Authoring user.
    pub author_id: Uuid,
    /// Note body.
    pub note: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of the `applications` table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    /// Internal application identifier.
    pub id: Uuid,
    /// Owning lead.
    pub lead_id: Uuid,
    /// Agent copied from the lead.
    pub agent_id: Option<Uuid>,
    /// Pipeline stage.
    pub stage: String,
    /// Loan amount.
    pub loan_amount: i64,
    /// Interest rate in basis points.
    pub interest_rate_bp: Option<i32>,
    /// Tenure in months.
    pub tenure_months: Option<i32>,
    /// Monthly instalment.
    pub monthly_emi: Option<i64>,
    /// Disbursed amount.
    pub disbursed_amount: Option<i64>,
    /// Disbursement time.
    pub disbursed_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
