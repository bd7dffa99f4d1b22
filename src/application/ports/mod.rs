//! Port contracts for application persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by pipeline services
//! and the board controller.

pub mod repository;

pub use repository::{
    ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult,
};
