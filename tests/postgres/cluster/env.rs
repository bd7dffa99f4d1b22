//! Environment preparation for the embedded cluster.

use super::BoxError;
use crate::test_helpers::EnvChange;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use std::ffi::OsString;
use std::io;
use std::net::TcpListener;

const WORKER_VAR: &str = "PG_EMBEDDED_WORKER";
const WORKER_BINARY: &str = "pg_worker";

/// Changes needed before bootstrapping: a free port unless `PG_PORT` is
/// set, and the privileged worker when running as root.
pub(super) fn bootstrap_env() -> Result<Vec<EnvChange>, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }

    let needs_worker = matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os(WORKER_VAR).is_none();
    if needs_worker {
        let worker = worker_on_path().ok_or_else(|| {
            Box::new(io::Error::new(
                io::ErrorKind::NotFound,
                "running as root needs PG_EMBEDDED_WORKER or a pg_worker binary on PATH",
            )) as BoxError
        })?;
        changes.push((OsString::from(WORKER_VAR), Some(worker)));
    }
    Ok(changes)
}

pub(super) fn to_os_changes(env_vars: &[(String, Option<String>)]) -> Vec<EnvChange> {
    env_vars
        .iter()
        .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
        .collect()
}

fn free_port() -> Result<OsString, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(|err| Box::new(err) as BoxError)?;
    let port = listener
        .local_addr()
        .map_err(|err| Box::new(err) as BoxError)?
        .port();
    Ok(OsString::from(port.to_string()))
}

fn worker_on_path() -> Option<OsString> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(WORKER_BINARY))
        .find(|candidate| candidate.is_file())
        .map(std::path::PathBuf::into_os_string)
}
