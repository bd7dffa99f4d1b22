//! `PostgreSQL` adapters for lead, note and application persistence.

mod applications;
mod conversion;
mod leads;
mod models;
mod repository;
mod schema;

pub use conversion::RowConversionError;
pub use repository::{PipelinePgPool, PostgresStore};
