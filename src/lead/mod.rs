//! Lead intake, status tracking and notes.
//!
//! Leads are uploaded or entered by administrators, assigned to agents and
//! worked through the status taxonomy. Setting the qualifying status spawns a
//! loan application in the pipeline. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]
//!
//! Adapters shared with the application pipeline live in
//! [`crate::adapters`], since cascading deletes span both contexts.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
