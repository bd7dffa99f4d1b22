//! Domain model for leads and their working status.
//!
//! The status taxonomy and its open/close derivation are the single source
//! of truth for a lead's final status; every write path goes through
//! [`Lead::set_status`] and the [`StatusChange`] it returns.

mod error;
mod filter;
mod ids;
mod lead;
mod note;
mod status;

pub use error::{LeadDomainError, ParseFinalStatusError, ParseLeadStatusError};
pub use filter::{LeadFilter, LeadOrdering, LeadPage, LeadQuery, PageRequest};
pub use ids::{AppNo, LeadAmount, LeadId, MobileNumber};
pub use lead::{Lead, LeadSummary, NewLead, PersistedLeadData, StatusChange};
pub use note::{LeadNote, NoteId, NoteText, PersistedLeadNote};
pub use status::{FinalStatus, LeadStatus, derive_final_status};
