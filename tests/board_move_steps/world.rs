//! Shared world state for board move BDD scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use loanboard::{
    adapters::memory::InMemoryStore,
    application::{
        domain::{Application, ApplicationCard, ApplicationFilter, ApplicationId, StageChange},
        ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
    },
    board::{KanbanBoard, MoveOutcome},
    notice::RecordingNotifier,
    session::{Session, UserId},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Application store whose stage writes can be switched to fail.
#[derive(Clone, Default)]
pub struct SwitchableStore {
    pub inner: InMemoryStore,
    reject_writes: Arc<AtomicBool>,
}

impl SwitchableStore {
    /// Makes every later stage write fail.
    pub fn reject_stage_writes(&self) {
        self.reject_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ApplicationRepository for SwitchableStore {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        self.inner.store(application).await
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        ApplicationRepository::find_by_id(&self.inner, id).await
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> ApplicationRepositoryResult<Vec<ApplicationCard>> {
        ApplicationRepository::list(&self.inner, filter).await
    }

    async fn update_stage(
        &self,
        id: ApplicationId,
        change: &StageChange,
    ) -> ApplicationRepositoryResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(ApplicationRepositoryError::persistence(
                std::io::Error::other("connection reset"),
            ));
        }
        self.inner.update_stage(id, change).await
    }

    async fn update_details(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        ApplicationRepository::update_details(&self.inner, application).await
    }
}

/// Board type used by the BDD world.
pub type TestBoard = KanbanBoard<SwitchableStore, RecordingNotifier, DefaultClock>;

/// Scenario world for board behaviour tests.
pub struct BoardWorld {
    pub store: SwitchableStore,
    pub notifier: Arc<RecordingNotifier>,
    pub board: TestBoard,
    pub session: Session,
    pub application_id: Option<ApplicationId>,
    pub last_outcome: Option<MoveOutcome>,
}

impl BoardWorld {
    /// Creates a world with an empty store and an unloaded board.
    #[must_use]
    pub fn new() -> Self {
        let store = SwitchableStore::default();
        let notifier = Arc::new(RecordingNotifier::new());
        let session = Session::agent(UserId::new());
        let board = KanbanBoard::new(
            session,
            Arc::new(store.clone()),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        );
        Self {
            store,
            notifier,
            board,
            session,
            application_id: None,
            last_outcome: None,
        }
    }

    /// Returns the scenario application id.
    ///
    /// # Errors
    ///
    /// Returns an error if no application has been seeded.
    pub fn application_id(&self) -> Result<ApplicationId, eyre::Report> {
        self.application_id
            .ok_or_else(|| eyre::eyre!("missing application in scenario world"))
    }
}

impl Default for BoardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
