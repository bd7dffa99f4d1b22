//! In-memory store for service tests and local runs.

mod applications;
mod leads;

use crate::application::domain::{Application, ApplicationId};
use crate::lead::domain::{Lead, LeadId, LeadNote};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory store of leads, notes and applications.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    leads: HashMap<LeadId, Lead>,
    notes: Vec<LeadNote>,
    applications: HashMap<ApplicationId, Application>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<E>(
        &self,
        into_error: impl FnOnce(std::io::Error) -> E,
    ) -> Result<RwLockReadGuard<'_, StoreState>, E> {
        self.state
            .read()
            .map_err(|err| into_error(std::io::Error::other(err.to_string())))
    }

    fn write<E>(
        &self,
        into_error: impl FnOnce(std::io::Error) -> E,
    ) -> Result<RwLockWriteGuard<'_, StoreState>, E> {
        self.state
            .write()
            .map_err(|err| into_error(std::io::Error::other(err.to_string())))
    }
}

fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
