//! `PostgreSQL` store handle and blocking-pool plumbing.

use crate::application::ports::ApplicationRepositoryError;
use crate::lead::ports::LeadRepositoryError;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;
use std::sync::Arc;

/// `PostgreSQL` connection pool type used by the store.
pub type PipelinePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed store of leads, notes and applications.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PipelinePgPool,
}

/// Repository errors that can wrap an infrastructure failure.
pub(super) trait PersistenceFailure: Send + 'static {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

impl PersistenceFailure for LeadRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceFailure for ApplicationRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

enum TransactionError<E> {
    Database(DieselError),
    Rejected(E),
}

impl<E> From<DieselError> for TransactionError<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl PostgresStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PipelinePgPool) -> Self {
        Self { pool }
    }

    pub(super) async fn run_blocking<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: PersistenceFailure,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(E::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(E::persistence)?
    }
}

/// Runs `f` in a database transaction, rolling back when it returns an
/// error.
pub(super) fn in_transaction<T, E, F>(connection: &mut PgConnection, f: F) -> Result<T, E>
where
    E: PersistenceFailure,
    F: FnOnce(&mut PgConnection) -> Result<T, E>,
{
    connection
        .transaction::<T, TransactionError<E>, _>(|tx| f(tx).map_err(TransactionError::Rejected))
        .map_err(|err| match err {
            TransactionError::Database(db_err) => E::persistence(db_err),
            TransactionError::Rejected(rejection) => rejection,
        })
}
