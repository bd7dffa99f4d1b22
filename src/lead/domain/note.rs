//! Append-only notes authored against a lead.

use super::{LeadDomainError, LeadId};
use crate::session::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a lead note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Creates a new random note identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a note identifier from an existing UUID.
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

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty note body of bounded length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteText(String);

impl NoteText {
    /// Maximum note length in characters.
    pub const MAX_CHARS: usize = 500;

    /// Creates a validated note body.
    ///
    /// # Errors
    ///
    /// Returns [`LeadDomainError::EmptyNote`] for blank input and
    /// [`LeadDomainError::NoteTooLong`] above [`Self::MAX_CHARS`].
    pub fn new(value: impl Into<String>) -> Result<Self, LeadDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(LeadDomainError::EmptyNote);
        }
        let length = normalized.chars().count();
        if length > Self::MAX_CHARS {
            return Err(LeadDomainError::NoteTooLong { length });
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the note body as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A note left on a lead by an administrator or agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadNote {
    id: NoteId,
    lead_id: LeadId,
    author_id: UserId,
    note: NoteText,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLeadNote {
    /// Persisted note identifier.
    pub id: NoteId,
    /// Owning lead.
    pub lead_id: LeadId,
    /// Author of the note.
    pub author_id: UserId,
    /// Note body.
    pub note: NoteText,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl LeadNote {
    /// Creates a note authored now.
    #[must_use]
    pub fn new(lead_id: LeadId, author_id: UserId, note: NoteText, clock: &impl Clock) -> Self {
        Self {
            id: NoteId::new(),
            lead_id,
            author_id,
            note,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a note from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLeadNote) -> Self {
        Self {
            id: data.id,
            lead_id: data.lead_id,
            author_id: data.author_id,
            note: data.note,
            created_at: data.created_at,
        }
    }

    /// Returns the note identifier.
    #[must_use]
    pub const fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the owning lead.
    #[must_use]
    pub const fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Returns the note body.
    #[must_use]
    pub const fn note(&self) -> &NoteText {
        &self.note
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
