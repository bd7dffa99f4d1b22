//! Application services for lead intake, status transitions and notes.

mod intake;
mod lifecycle;
mod notes;

pub use intake::{DuplicateKey, LeadDraft, RejectionReason, RowRejection};
pub use lifecycle::{
    EditLeadRequest, LeadLifecycleError, LeadLifecycleResult, LeadLifecycleService, SpawnError,
    StatusUpdateOutcome, UpdateLeadStatusRequest,
};
