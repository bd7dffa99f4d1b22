//! Append-only notes on leads.

use super::lifecycle::{LeadLifecycleResult, LeadLifecycleService};
use crate::application::ports::ApplicationRepository;
use crate::lead::{
    domain::{LeadId, LeadNote, NoteText},
    ports::{LeadNoteRepository, LeadRepository},
};
use crate::session::Session;
use mockable::Clock;
use tracing::info;

impl<R, A, C> LeadLifecycleService<R, A, C>
where
    R: LeadRepository + LeadNoteRepository,
    A: ApplicationRepository,
    C: Clock + Send + Sync,
{
    /// Adds a note to a lead, authored by the session user.
    ///
    /// # Errors
    ///
    /// Returns [`super::LeadLifecycleError::Domain`] for a blank or
    /// over-long note, and [`super::LeadLifecycleError::NotFound`] or
    /// [`super::LeadLifecycleError::Repository`] when the lookup or write
    /// fails.
    pub async fn add_note(
        &self,
        session: &Session,
        lead_id: LeadId,
        text: &str,
    ) -> LeadLifecycleResult<LeadNote> {
        let body = NoteText::new(text)?;
        let lead = self.find_visible(session, lead_id).await?;
        let note = LeadNote::new(lead.id(), session.user_id(), body, &*self.clock);
        self.leads.append(&note).await?;
        info!(lead_id = %lead_id, note_id = %note.id(), "lead note added");
        Ok(note)
    }

    /// Returns the notes of a lead, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::LeadLifecycleError::NotFound`] for an unknown or
    /// invisible lead and [`super::LeadLifecycleError::Repository`] when the
    /// read fails.
    pub async fn notes(&self, session: &Session, lead_id: LeadId) -> LeadLifecycleResult<Vec<LeadNote>> {
        let lead = self.find_visible(session, lead_id).await?;
        Ok(self.leads.list_for_lead(lead.id()).await?)
    }
}
