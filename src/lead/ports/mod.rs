//! Port contracts for lead persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by lead services.

pub mod repository;

pub use repository::{
    LeadNoteRepository, LeadRepository, LeadRepositoryError, LeadRepositoryResult,
};
