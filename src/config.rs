//! Store configuration loaded from the environment.
//!
//! Reads `DATABASE_URL` and `LOANBOARD_POOL_SIZE`, after loading a `.env`
//! file from the working directory when one exists.

use crate::adapters::postgres::{PipelinePgPool, PostgresStore};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "LOANBOARD_POOL_SIZE";

/// Errors raised while loading configuration or opening the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    /// The pool size is not a positive integer.
    #[error("{POOL_SIZE_VAR} must be a positive integer, got '{0}'")]
    InvalidPoolSize(String),
    /// The `.env` file exists but could not be read.
    #[error("could not load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
    /// The connection pool could not be built.
    #[error("could not open connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Connection settings for the `PostgreSQL` store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    pool_size: u32,
}

impl StoreConfig {
    /// Pool size used when [`POOL_SIZE_VAR`] is unset.
    pub const DEFAULT_POOL_SIZE: u32 = 8;

    /// Creates a configuration with the default pool size.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: Self::DEFAULT_POOL_SIZE,
        }
    }

    /// Overrides the pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Loads the configuration from the process environment and an
    /// optional `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `.env` is unreadable, `DATABASE_URL`
    /// is missing or the pool size is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            return Err(ConfigError::DotEnv(err));
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is missing or
    /// blank and [`ConfigError::InvalidPoolSize`] when the pool size is not
    /// a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;

        let pool_size = match lookup(POOL_SIZE_VAR) {
            None => Self::DEFAULT_POOL_SIZE,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize(raw))?,
        };

        Ok(Self {
            database_url,
            pool_size,
        })
    }

    /// Returns the connection string.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Builds the connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot open its initial
    /// connections.
    pub fn build_pool(&self) -> Result<PipelinePgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        Ok(Pool::builder().max_size(self.pool_size).build(manager)?)
    }

    /// Builds the pool and wraps it in a [`PostgresStore`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot be built.
    pub fn connect(&self) -> Result<PostgresStore, ConfigError> {
        Ok(PostgresStore::new(self.build_pool()?))
    }
}
