//! User-facing notices and the port that delivers them.
//!
//! Every outcome surfaced to the user falls into one of four categories so
//! that a success, a locally rejected input, a failed remote write and a
//! half-applied two-step write are always distinguishable.

use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

/// Category of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// The requested change was committed.
    Success,
    /// Input was rejected locally; no remote call was made.
    ValidationRejected,
    /// A remote read or write failed.
    RemoteFailure,
    /// The first step of a two-step write committed but the second failed.
    PartialFailure,
}

impl NoticeKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ValidationRejected => "validation_rejected",
            Self::RemoteFailure => "remote_failure",
            Self::PartialFailure => "partial_failure",
        }
    }
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
}

impl Notice {
    /// Creates a notice of the given kind.
    #[must_use]
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Creates a success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, message)
    }

    /// Creates a validation rejection notice.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::ValidationRejected, message)
    }

    /// Creates a remote failure notice.
    #[must_use]
    pub fn remote_failure(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::RemoteFailure, message)
    }

    /// Creates a partial failure notice.
    #[must_use]
    pub fn partial_failure(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::PartialFailure, message)
    }

    /// Returns the notice category.
    #[must_use]
    pub const fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Delivers notices to the user.
pub trait Notifier: Send + Sync {
    /// Delivers one notice.
    fn notify(&self, notice: Notice);
}

/// Notifier that emits every notice as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let kind = notice.kind.as_str();
        match notice.kind {
            NoticeKind::Success => info!(kind, message = %notice.message, "notice"),
            NoticeKind::ValidationRejected | NoticeKind::PartialFailure => {
                warn!(kind, message = %notice.message, "notice");
            }
            NoticeKind::RemoteFailure => error!(kind, message = %notice.message, "notice"),
        }
    }
}

/// Notifier that keeps every notice in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every notice delivered so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns every notice delivered so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the kinds of every notice delivered so far.
    #[must_use]
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().iter().map(Notice::kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}
