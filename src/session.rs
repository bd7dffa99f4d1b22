//! Acting-user context injected into services.
//!
//! Authentication and session refresh live outside this crate. Callers build
//! a [`Session`] once the external auth service has resolved the signed-in
//! profile and pass it explicitly to every operation that needs to know who
//! is acting. Dropping the session is the sign-out teardown.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a user profile (administrator or agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Uploads, assigns and deletes leads; sees every record.
    Admin,
    /// Works the leads assigned to them; sees only their own records.
    Agent,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Error returned while parsing a user role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseRoleError(pub String);

/// The signed-in user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    role: Role,
}

impl Session {
    /// Creates a session for the given user and role.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Creates an administrator session.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    /// Creates an agent session.
    #[must_use]
    pub const fn agent(user_id: UserId) -> Self {
        Self::new(user_id, Role::Agent)
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for administrator sessions.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Returns the agent every read must be restricted to, if any.
    ///
    /// Administrators are unrestricted; agents only see their own records.
    #[must_use]
    pub const fn agent_scope(&self) -> Option<UserId> {
        match self.role {
            Role::Admin => None,
            Role::Agent => Some(self.user_id),
        }
    }

    /// Returns `true` when a record owned by `owner` is visible.
    #[must_use]
    pub fn can_see(&self, owner: Option<UserId>) -> bool {
        self.agent_scope()
            .is_none_or(|agent| owner == Some(agent))
    }
}
