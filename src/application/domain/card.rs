//! Board card read model and listing filter.

use super::{Application, Stage};
use crate::lead::domain::LeadSummary;
use crate::session::{Session, UserId};
use serde::Serialize;

/// An application joined with the borrower details of its lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCard {
    /// The application shown on the card.
    pub application: Application,
    /// Borrower details from the owning lead.
    pub lead: LeadSummary,
}

impl ApplicationCard {
    /// Creates a card.
    #[must_use]
    pub const fn new(application: Application, lead: LeadSummary) -> Self {
        Self { application, lead }
    }

    /// Returns `true` when the borrower name or mobile number contains
    /// `term`, ignoring case. Blank terms match every card.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        self.lead.name.as_deref().is_some_and(contains) || contains(self.lead.mobile_no.as_str())
    }
}

/// Predicates for listing application cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    agent_id: Option<UserId>,
    stage: Option<Stage>,
}

impl ApplicationFilter {
    /// Creates a filter that matches every application.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches applications in this stage.
    #[must_use]
    pub const fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Matches applications owned by this agent.
    #[must_use]
    pub const fn with_agent(mut self, agent_id: UserId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    /// Restricts the filter to what the session may see.
    #[must_use]
    pub const fn scoped_to(mut self, session: &Session) -> Self {
        if let Some(agent) = session.agent_scope() {
            self.agent_id = Some(agent);
        }
        self
    }

    /// Returns the agent predicate, if any.
    #[must_use]
    pub const fn agent_id(&self) -> Option<UserId> {
        self.agent_id
    }

    /// Returns the stage predicate, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Evaluates the filter against an application.
    #[must_use]
    pub fn matches(&self, application: &Application) -> bool {
        self.agent_id
            .is_none_or(|agent| application.agent_id() == Some(agent))
            && self.stage.is_none_or(|stage| application.stage() == stage)
    }
}
