//! Step definitions for lead status scenarios.

pub mod given;
pub mod when;
