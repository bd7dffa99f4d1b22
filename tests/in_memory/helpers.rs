//! Shared test helpers for in-memory integration tests.

use loanboard::{
    adapters::memory::InMemoryStore,
    application::services::PipelineService,
    board::KanbanBoard,
    lead::{
        domain::Lead,
        services::{LeadDraft, LeadLifecycleService},
    },
    notice::RecordingNotifier,
    session::{Session, UserId},
};
use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Lead service over the shared in-memory store.
pub type TestLeadService = LeadLifecycleService<InMemoryStore, InMemoryStore, DefaultClock>;
/// Pipeline service over the shared in-memory store.
pub type TestPipelineService = PipelineService<InMemoryStore, DefaultClock>;
/// Board over the shared in-memory store.
pub type TestBoard = KanbanBoard<InMemoryStore, RecordingNotifier, DefaultClock>;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// One store shared by every service, plus an admin and an agent.
pub struct Desk {
    pub store: InMemoryStore,
    pub leads: TestLeadService,
    pub pipeline: TestPipelineService,
    pub notifier: Arc<RecordingNotifier>,
    pub admin: Session,
    pub agent: Session,
}

impl Desk {
    /// Opens a board for `session` over the shared store.
    #[must_use]
    pub fn board(&self, session: Session) -> TestBoard {
        KanbanBoard::new(
            session,
            Arc::new(self.store.clone()),
            Arc::clone(&self.notifier),
            Arc::new(DefaultClock),
        )
    }
}

/// Provides a fresh desk for each test.
#[fixture]
pub fn desk() -> Desk {
    let store = InMemoryStore::new();
    Desk {
        leads: LeadLifecycleService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(DefaultClock),
        ),
        pipeline: PipelineService::new(Arc::new(store.clone()), Arc::new(DefaultClock)),
        store,
        notifier: Arc::new(RecordingNotifier::new()),
        admin: Session::admin(UserId::new()),
        agent: Session::agent(UserId::new()),
    }
}

/// Imports three leads for the desk's agent and returns them in row order.
///
/// # Errors
///
/// Returns an error if the import is rejected.
pub fn import_leads(
    rt: &Runtime,
    desk: &Desk,
) -> Result<Vec<Lead>, Box<dyn std::error::Error + Send + Sync>> {
    let rows = vec![
        LeadDraft::new("HL-1001", "9898000001")
            .with_name("Deepa Nair")
            .with_amount(600_000),
        LeadDraft::new("HL-1002", "9898000002")
            .with_name("Arjun Mehta")
            .with_amount(150_000),
        LeadDraft::new("HL-1003", "9898000003").with_name("Sana Qureshi"),
    ];
    Ok(rt.block_on(
        desk.leads
            .import_leads(&desk.admin, rows, desk.agent.user_id()),
    )?)
}
