//! Process environment overrides shared by integration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

/// Environment key paired with the value to set, or `None` to unset it.
pub type EnvChange = (OsString, Option<OsString>);

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies environment changes until dropped, then restores the previous
/// values. Holds a process-wide lock for its whole lifetime.
pub struct ScopedEnv {
    restore: Vec<EnvChange>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Applies every change in order.
    pub fn apply(changes: &[EnvChange]) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let restore = changes
            .iter()
            .map(|(key, value)| {
                let previous = env::var_os(key);
                write_var(key, value.as_ref());
                (key.clone(), previous)
            })
            .collect();
        Self {
            restore,
            _lock: lock,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, value) in self.restore.drain(..).rev() {
            write_var(&key, value.as_ref());
        }
    }
}

fn write_var(key: &OsString, value: Option<&OsString>) {
    // SAFETY: every mutation happens while `ENV_LOCK` is held.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}
