//! Storage adapters shared by the lead and application contexts.
//!
//! Each adapter implements [`crate::lead::ports::LeadRepository`],
//! [`crate::lead::ports::LeadNoteRepository`] and
//! [`crate::application::ports::ApplicationRepository`] over one store, so
//! that deleting a lead removes its notes and applications in the same
//! write.

pub mod memory;
pub mod postgres;
