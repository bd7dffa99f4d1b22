//! Loan application pipeline.
//!
//! Applications are spawned from leads that reach the qualifying status and
//! then move through four stages: Under Review, Approved, Rejected and
//! Disbursed. Entry into Disbursed is gated on a captured amount. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Orchestration services in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
