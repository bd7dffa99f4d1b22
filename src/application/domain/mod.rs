//! Domain model for loan applications and their pipeline stage.

mod application;
mod card;
mod error;
mod ids;
mod stage;
mod summary;

pub use application::{
    Application, ApplicationEdit, DisbursedAmount, Disbursement, InterestRate,
    PersistedApplicationData, StageChange,
};
pub use card::{ApplicationCard, ApplicationFilter};
pub use error::{ParseStageError, PipelineDomainError};
pub use ids::ApplicationId;
pub use stage::Stage;
pub use summary::{BoardSummary, StageSummary};
