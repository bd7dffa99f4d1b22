//! Per-test databases and seeding helpers for `PostgreSQL` adapter tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use loanboard::{
    application::{domain::Application, ports::ApplicationRepository},
    lead::{
        domain::{AppNo, Lead, LeadAmount, MobileNumber, NewLead},
        ports::LeadRepository,
    },
    session::UserId,
};
use loanboard::adapters::postgres::{PipelinePgPool, PostgresStore};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

/// Schema applied to the template database.
pub const PIPELINE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-16-000000_create_pipeline/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "loanboard_test_template";

/// Builds a single-threaded runtime for driving async repositories.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// Database cloned from the template, dropped with the guard.
pub struct ScratchDatabase {
    cluster: PostgresCluster,
    name: String,
}

impl ScratchDatabase {
    /// Clones the migrated template into a fresh database.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be built or cloned.
    pub fn create(cluster: PostgresCluster) -> Result<Self, BoxError> {
        cluster.ensure_template(TEMPLATE_DB, |url| {
            let mut connection =
                PgConnection::establish(url).map_err(|err| Box::new(err) as BoxError)?;
            connection
                .batch_execute(PIPELINE_SCHEMA_SQL)
                .map_err(|err| Box::new(err) as BoxError)
        })?;
        let name = format!("loanboard_{}", Uuid::new_v4().simple());
        cluster.clone_template(&name, TEMPLATE_DB)?;
        Ok(Self { cluster, name })
    }

    /// Returns the connection URL of this database.
    #[must_use]
    pub fn url(&self) -> String {
        self.cluster.database_url(&self.name)
    }
}

impl Drop for ScratchDatabase {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.name));
    }
}

/// Store over a scratch database plus the runtime that drives it.
///
/// Fields drop in order, so the pool closes before the database goes.
pub struct PgHarness {
    pub store: PostgresStore,
    pub rt: Runtime,
    pub database: ScratchDatabase,
    pub agent: UserId,
}

impl PgHarness {
    /// Opens a direct connection for assertions on raw rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn connect(&self) -> Result<PgConnection, BoxError> {
        PgConnection::establish(&self.database.url()).map_err(|err| Box::new(err) as BoxError)
    }

    /// Stores one lead owned by the harness agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the values are invalid or the insert fails.
    pub fn seed_lead(
        &self,
        app_no: &str,
        name: &str,
        mobile_no: &str,
        amount: Option<u64>,
    ) -> Result<Lead, BoxError> {
        let lead = Lead::new(
            NewLead {
                app_no: AppNo::new(app_no)?,
                name: Some(name.to_owned()),
                mobile_no: MobileNumber::new(mobile_no)?,
                amount: amount.map(LeadAmount::new).transpose()?,
            },
            self.agent,
            &DefaultClock,
        );
        self.rt
            .block_on(self.store.store_many(std::slice::from_ref(&lead)))?;
        Ok(lead)
    }

    /// Stores an application spawned from `lead`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn seed_application(&self, lead: &Lead) -> Result<Application, BoxError> {
        let application = Application::spawn_from_lead(lead, &DefaultClock);
        self.rt.block_on(self.store.store(&application))?;
        Ok(application)
    }

    /// Counts the rows of `table` that belong to `lead_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_for_lead(&self, table: &str, lead_id: Uuid) -> Result<i64, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct Count {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            total: i64,
        }

        let mut connection = self.connect()?;
        let row = diesel::sql_query(format!(
            "SELECT COUNT(*) AS total FROM {table} WHERE lead_id = $1"
        ))
        .bind::<diesel::sql_types::Uuid, _>(lead_id)
        .get_result::<Count>(&mut connection)?;
        Ok(row.total)
    }
}

/// Provides a store over a fresh database cloned from the template.
#[fixture]
pub fn pg(postgres_cluster: PostgresCluster) -> PgHarness {
    let database = ScratchDatabase::create(postgres_cluster).expect("scratch database");
    let pool: PipelinePgPool = Pool::builder()
        .max_size(2)
        .build(ConnectionManager::<PgConnection>::new(database.url()))
        .expect("connection pool");
    PgHarness {
        store: PostgresStore::new(pool),
        rt: test_runtime().expect("tokio runtime"),
        database,
        agent: UserId::new(),
    }
}
