//! Application repository over the in-memory store.

use super::InMemoryStore;
use crate::application::{
    domain::{
        Application, ApplicationCard, ApplicationFilter, ApplicationId, PersistedApplicationData,
        StageChange,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
};
use async_trait::async_trait;

#[async_trait]
impl ApplicationRepository for InMemoryStore {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let mut state = self.write(ApplicationRepositoryError::persistence)?;
        if !state.leads.contains_key(&application.lead_id()) {
            return Err(ApplicationRepositoryError::LeadNotFound(application.lead_id()));
        }
        if state.applications.contains_key(&application.id()) {
            return Err(ApplicationRepositoryError::DuplicateApplication(
                application.id(),
            ));
        }
        state
            .applications
            .insert(application.id(), application.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        let state = self.read(ApplicationRepositoryError::persistence)?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> ApplicationRepositoryResult<Vec<ApplicationCard>> {
        let state = self.read(ApplicationRepositoryError::persistence)?;
        let mut cards: Vec<ApplicationCard> = state
            .applications
            .values()
            .filter(|application| filter.matches(application))
            .filter_map(|application| {
                state
                    .leads
                    .get(&application.lead_id())
                    .map(|lead| ApplicationCard::new(application.clone(), lead.summary()))
            })
            .collect();
        cards.sort_by(|a, b| {
            b.application
                .created_at()
                .cmp(&a.application.created_at())
                .then_with(|| a.application.id().cmp(&b.application.id()))
        });
        Ok(cards)
    }

    async fn update_stage(
        &self,
        id: ApplicationId,
        change: &StageChange,
    ) -> ApplicationRepositoryResult<()> {
        let mut state = self.write(ApplicationRepositoryError::persistence)?;
        let application = state
            .applications
            .get_mut(&id)
            .ok_or(ApplicationRepositoryError::NotFound(id))?;
        application.apply_change(change);
        Ok(())
    }

    async fn update_details(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let mut state = self.write(ApplicationRepositoryError::persistence)?;
        let stored = state
            .applications
            .get_mut(&application.id())
            .ok_or(ApplicationRepositoryError::NotFound(application.id()))?;
        *stored = Application::from_persisted(PersistedApplicationData {
            id: stored.id(),
            lead_id: stored.lead_id(),
            agent_id: stored.agent_id(),
            stage: stored.stage(),
            loan_amount: application.loan_amount(),
            interest_rate: application.interest_rate(),
            tenure_months: application.tenure_months(),
            monthly_emi: application.monthly_emi(),
            disbursed_amount: stored.disbursed_amount(),
            disbursed_date: stored.disbursed_date(),
            notes: application.notes().map(str::to_owned),
            created_at: stored.created_at(),
            updated_at: application.updated_at(),
        });
        Ok(())
    }
}
