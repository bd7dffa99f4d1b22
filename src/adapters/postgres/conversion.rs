//! Conversions between domain aggregates and Diesel rows.

use super::models::{ApplicationRow, LeadNoteRow, LeadRow};
use crate::application::domain::{
    Application, ApplicationId, InterestRate, ParseStageError, PersistedApplicationData, Stage,
};
use crate::lead::domain::{
    AppNo, Lead, LeadAmount, LeadDomainError, LeadId, LeadNote, LeadStatus, MobileNumber, NoteId,
    NoteText, ParseLeadStatusError, PersistedLeadData, PersistedLeadNote,
};
use crate::money::Rupees;
use crate::session::UserId;
use thiserror::Error;

/// A stored row that does not map onto a valid domain value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RowConversionError {
    /// A numeric column holds a value outside the domain range.
    #[error("column {column} holds out-of-range value {value}")]
    OutOfRange {
        /// Column name.
        column: &'static str,
        /// Offending value, widened for reporting.
        value: i128,
    },
    /// A lead column failed validation.
    #[error(transparent)]
    Lead(#[from] LeadDomainError),
    /// The status column holds an unknown status.
    #[error(transparent)]
    Status(#[from] ParseLeadStatusError),
    /// The stage column holds an unknown stage.
    #[error(transparent)]
    Stage(#[from] ParseStageError),
}

pub(super) fn to_i64(column: &'static str, value: u64) -> Result<i64, RowConversionError> {
    i64::try_from(value).map_err(|_| RowConversionError::OutOfRange {
        column,
        value: i128::from(value),
    })
}

pub(super) fn to_i32(column: &'static str, value: u32) -> Result<i32, RowConversionError> {
    i32::try_from(value).map_err(|_| RowConversionError::OutOfRange {
        column,
        value: i128::from(value),
    })
}

fn to_u64(column: &'static str, value: i64) -> Result<u64, RowConversionError> {
    u64::try_from(value).map_err(|_| RowConversionError::OutOfRange {
        column,
        value: i128::from(value),
    })
}

fn to_u32(column: &'static str, value: i32) -> Result<u32, RowConversionError> {
    u32::try_from(value).map_err(|_| RowConversionError::OutOfRange {
        column,
        value: i128::from(value),
    })
}

pub(super) fn lead_to_row(lead: &Lead) -> Result<LeadRow, RowConversionError> {
    Ok(LeadRow {
        id: lead.id().into_inner(),
        app_no: lead.app_no().as_str().to_owned(),
        name: lead.name().map(str::to_owned),
        mobile_no: lead.mobile_no().as_str().to_owned(),
        amount: lead
            .amount()
            .map(|amount| to_i64("amount", amount.value()))
            .transpose()?,
        status: lead.status().map(|status| status.as_str().to_owned()),
        final_status: lead.final_status().as_str().to_owned(),
        agent_id: lead.agent_id().map(UserId::into_inner),
        created_at: lead.created_at(),
        uploaded_at: lead.uploaded_at(),
        updated_at: lead.updated_at(),
    })
}

/// Rebuilds a lead. The stored final status is ignored and re-derived from
/// the status column.
pub(super) fn row_to_lead(row: LeadRow) -> Result<Lead, RowConversionError> {
    let LeadRow {
        id,
        app_no,
        name,
        mobile_no,
        amount,
        status,
        agent_id,
        created_at,
        uploaded_at,
        updated_at,
        ..
    } = row;

    let lead_amount = amount
        .map(|value| {
            to_u64("amount", value)
                .and_then(|rupees| LeadAmount::new(rupees).map_err(RowConversionError::from))
        })
        .transpose()?;
    let lead_status = status
        .as_deref()
        .map(LeadStatus::try_from)
        .transpose()?;

    Ok(Lead::from_persisted(PersistedLeadData {
        id: LeadId::from_uuid(id),
        app_no: AppNo::new(app_no)?,
        name,
        mobile_no: MobileNumber::new(mobile_no)?,
        amount: lead_amount,
        status: lead_status,
        agent_id: agent_id.map(UserId::from_uuid),
        created_at,
        uploaded_at,
        updated_at,
    }))
}

pub(super) fn note_to_row(note: &LeadNote) -> LeadNoteRow {
    LeadNoteRow {
        id: note.id().into_inner(),
        lead_id: note.lead_id().into_inner(),
        author_id: note.author_id().into_inner(),
        note: note.note().as_str().to_owned(),
        created_at: note.created_at(),
    }
}

pub(super) fn row_to_note(row: LeadNoteRow) -> Result<LeadNote, RowConversionError> {
    Ok(LeadNote::from_persisted(PersistedLeadNote {
        id: NoteId::from_uuid(row.id),
        lead_id: LeadId::from_uuid(row.lead_id),
        author_id: UserId::from_uuid(row.author_id),
        note: NoteText::new(row.note)?,
        created_at: row.created_at,
    }))
}

pub(super) fn application_to_row(
    application: &Application,
) -> Result<ApplicationRow, RowConversionError> {
    Ok(ApplicationRow {
        id: application.id().into_inner(),
        lead_id: application.lead_id().into_inner(),
        agent_id: application.agent_id().map(UserId::into_inner),
        stage: application.stage().as_str().to_owned(),
        loan_amount: to_i64("loan_amount", application.loan_amount().value())?,
        interest_rate_bp: application
            .interest_rate()
            .map(|rate| to_i32("interest_rate_bp", rate.basis_points()))
            .transpose()?,
        tenure_months: application
            .tenure_months()
            .map(|months| to_i32("tenure_months", months))
            .transpose()?,
        monthly_emi: application
            .monthly_emi()
            .map(|emi| to_i64("monthly_emi", emi.value()))
            .transpose()?,
        disbursed_amount: application
            .disbursed_amount()
            .map(|amount| to_i64("disbursed_amount", amount.value()))
            .transpose()?,
        disbursed_date: application.disbursed_date(),
        notes: application.notes().map(str::to_owned),
        created_at: application.created_at(),
        updated_at: application.updated_at(),
    })
}

pub(super) fn row_to_application(row: ApplicationRow) -> Result<Application, RowConversionError> {
    let rupees = |column, value| to_u64(column, value).map(Rupees::new);
    Ok(Application::from_persisted(PersistedApplicationData {
        id: ApplicationId::from_uuid(row.id),
        lead_id: LeadId::from_uuid(row.lead_id),
        agent_id: row.agent_id.map(UserId::from_uuid),
        stage: Stage::try_from(row.stage.as_str())?,
        loan_amount: rupees("loan_amount", row.loan_amount)?,
        interest_rate: row
            .interest_rate_bp
            .map(|bp| to_u32("interest_rate_bp", bp).map(InterestRate::from_basis_points))
            .transpose()?,
        tenure_months: row
            .tenure_months
            .map(|months| to_u32("tenure_months", months))
            .transpose()?,
        monthly_emi: row
            .monthly_emi
            .map(|emi| rupees("monthly_emi", emi))
            .transpose()?,
        disbursed_amount: row
            .disbursed_amount
            .map(|amount| rupees("disbursed_amount", amount))
            .transpose()?,
        disbursed_date: row.disbursed_date,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
