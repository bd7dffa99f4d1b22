//! Lead and note repositories over the in-memory store.

use super::{InMemoryStore, saturating_usize};
use crate::lead::{
    domain::{AppNo, Lead, LeadId, LeadNote, LeadPage, LeadQuery, MobileNumber, PersistedLeadData, StatusChange},
    ports::{LeadNoteRepository, LeadRepository, LeadRepositoryError, LeadRepositoryResult},
};
use crate::session::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

#[async_trait]
impl LeadRepository for InMemoryStore {
    async fn store_many(&self, leads: &[Lead]) -> LeadRepositoryResult<()> {
        let mut state = self.write(LeadRepositoryError::persistence)?;

        let mut ids = HashSet::new();
        let mut app_nos: HashSet<&AppNo> =
            state.leads.values().map(Lead::app_no).collect();
        let mut mobiles: HashSet<&MobileNumber> =
            state.leads.values().map(Lead::mobile_no).collect();
        for lead in leads {
            if state.leads.contains_key(&lead.id()) || !ids.insert(lead.id()) {
                return Err(LeadRepositoryError::DuplicateLead(lead.id()));
            }
            if !app_nos.insert(lead.app_no()) {
                return Err(LeadRepositoryError::DuplicateAppNo(lead.app_no().clone()));
            }
            if !mobiles.insert(lead.mobile_no()) {
                return Err(LeadRepositoryError::DuplicateMobile(lead.mobile_no().clone()));
            }
        }
        drop(app_nos);
        drop(mobiles);

        for lead in leads {
            state.leads.insert(lead.id(), lead.clone());
        }
        Ok(())
    }

    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>> {
        let state = self.read(LeadRepositoryError::persistence)?;
        Ok(state.leads.get(&id).cloned())
    }

    async fn find_conflicts(
        &self,
        app_nos: &[AppNo],
        mobiles: &[MobileNumber],
    ) -> LeadRepositoryResult<Vec<Lead>> {
        let state = self.read(LeadRepositoryError::persistence)?;
        Ok(state
            .leads
            .values()
            .filter(|lead| app_nos.contains(lead.app_no()) || mobiles.contains(lead.mobile_no()))
            .cloned()
            .collect())
    }

    async fn list(&self, query: &LeadQuery) -> LeadRepositoryResult<LeadPage> {
        let state = self.read(LeadRepositoryError::persistence)?;
        let mut matching: Vec<&Lead> = state
            .leads
            .values()
            .filter(|lead| query.filter.matches(lead))
            .collect();
        matching.sort_by(|a, b| query.ordering.compare(a, b).then_with(|| a.id().cmp(&b.id())));

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let leads = matching
            .into_iter()
            .skip(saturating_usize(query.page.offset()))
            .take(saturating_usize(query.page.limit()))
            .cloned()
            .collect();
        Ok(LeadPage { leads, total })
    }

    async fn update_status(&self, id: LeadId, change: &StatusChange) -> LeadRepositoryResult<()> {
        let mut state = self.write(LeadRepositoryError::persistence)?;
        let lead = state
            .leads
            .get_mut(&id)
            .ok_or(LeadRepositoryError::NotFound(id))?;
        lead.apply_status_change(change);
        Ok(())
    }

    async fn update_details(&self, lead: &Lead) -> LeadRepositoryResult<()> {
        let mut state = self.write(LeadRepositoryError::persistence)?;
        let stored = state
            .leads
            .get_mut(&lead.id())
            .ok_or(LeadRepositoryError::NotFound(lead.id()))?;
        *stored = Lead::from_persisted(PersistedLeadData {
            id: stored.id(),
            app_no: stored.app_no().clone(),
            name: lead.name().map(str::to_owned),
            mobile_no: stored.mobile_no().clone(),
            amount: lead.amount(),
            status: stored.status(),
            agent_id: stored.agent_id(),
            created_at: stored.created_at(),
            uploaded_at: stored.uploaded_at(),
            updated_at: lead.updated_at(),
        });
        Ok(())
    }

    async fn assign_agent(
        &self,
        ids: &[LeadId],
        agent_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<()> {
        let mut state = self.write(LeadRepositoryError::persistence)?;
        if let Some(missing) = ids.iter().find(|id| !state.leads.contains_key(id)) {
            return Err(LeadRepositoryError::NotFound(*missing));
        }
        for id in ids {
            if let Some(lead) = state.leads.get_mut(id) {
                lead.assign_to(agent_id, assigned_at);
            }
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[LeadId]) -> LeadRepositoryResult<u64> {
        let mut state = self.write(LeadRepositoryError::persistence)?;
        if let Some(missing) = ids.iter().find(|id| !state.leads.contains_key(id)) {
            return Err(LeadRepositoryError::NotFound(*missing));
        }

        let doomed: HashSet<LeadId> = ids.iter().copied().collect();
        state.leads.retain(|id, _| !doomed.contains(id));
        state.notes.retain(|note| !doomed.contains(&note.lead_id()));
        state
            .applications
            .retain(|_, application| !doomed.contains(&application.lead_id()));
        Ok(u64::try_from(doomed.len()).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl LeadNoteRepository for InMemoryStore {
    async fn append(&self, note: &LeadNote) -> LeadRepositoryResult<()> {
        let mut state = self.write(LeadRepositoryError::persistence)?;
        if !state.leads.contains_key(&note.lead_id()) {
            return Err(LeadRepositoryError::NotFound(note.lead_id()));
        }
        state.notes.push(note.clone());
        Ok(())
    }

    async fn list_for_lead(&self, lead_id: LeadId) -> LeadRepositoryResult<Vec<LeadNote>> {
        let state = self.read(LeadRepositoryError::persistence)?;
        let mut notes: Vec<LeadNote> = state
            .notes
            .iter()
            .filter(|note| note.lead_id() == lead_id)
            .cloned()
            .collect();
        // Later appends win ties, matching insertion order newest first.
        notes.reverse();
        notes.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(notes)
    }
}
