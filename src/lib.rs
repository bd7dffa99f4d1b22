//! Loanboard: lead tracking and loan application pipeline.
//!
//! Leads are uploaded by administrators, worked by agents through a status
//! taxonomy, and promoted into loan applications when they reach the
//! qualifying status. Applications then move across a four-stage kanban
//! board with optimistic updates and rollback on failed writes.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`lead`]: Lead intake, status derivation, notes and assignment
//! - [`application`]: Application stages, disbursement gating and summaries
//! - [`board`]: Drag-and-drop stage board with optimistic commits
//! - [`adapters`]: Repository implementations shared by both contexts
//! - [`notice`]: User-facing outcome notices
//! - [`config`]: Store configuration from the environment

pub mod adapters;
pub mod application;
pub mod board;
pub mod config;
pub mod lead;
pub mod money;
pub mod notice;
pub mod session;
