//! Composable read-side predicates, ordering and pagination for leads.

use super::{FinalStatus, Lead, LeadStatus};
use crate::session::{Session, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

/// AND-combined filter predicates over leads.
///
/// Every predicate left unset matches all leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    search: Option<String>,
    status: Option<LeadStatus>,
    final_status: Option<FinalStatus>,
    agent_id: Option<UserId>,
    created_from: Option<NaiveDate>,
    created_to: Option<NaiveDate>,
}

impl LeadFilter {
    /// Creates a filter that matches every lead.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches leads whose name, mobile number or application number
    /// contains `term`, ignoring case. Blank terms are ignored.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        let raw = term.into();
        let trimmed = raw.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Matches leads with exactly this working status.
    #[must_use]
    pub const fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Matches leads with exactly this final status.
    #[must_use]
    pub const fn with_final_status(mut self, final_status: FinalStatus) -> Self {
        self.final_status = Some(final_status);
        self
    }

    /// Matches leads assigned to this agent.
    #[must_use]
    pub const fn with_agent(mut self, agent_id: UserId) -> Self {
        self.agent_id = Some(agent_id);
        self
    }

    /// Matches leads created on or after the start of `date` (UTC).
    #[must_use]
    pub const fn created_from(mut self, date: NaiveDate) -> Self {
        self.created_from = Some(date);
        self
    }

    /// Matches leads created on or before the end of `date` (UTC).
    #[must_use]
    pub const fn created_to(mut self, date: NaiveDate) -> Self {
        self.created_to = Some(date);
        self
    }

    /// Restricts the filter to what the session may see.
    ///
    /// Agent sessions are pinned to their own leads regardless of any agent
    /// filter the caller supplied.
    #[must_use]
    pub const fn scoped_to(mut self, session: &Session) -> Self {
        if let Some(agent) = session.agent_scope() {
            self.agent_id = Some(agent);
        }
        self
    }

    /// Returns the search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns the working status predicate, if any.
    #[must_use]
    pub const fn status(&self) -> Option<LeadStatus> {
        self.status
    }

    /// Returns the final status predicate, if any.
    #[must_use]
    pub const fn final_status(&self) -> Option<FinalStatus> {
        self.final_status
    }

    /// Returns the agent predicate, if any.
    #[must_use]
    pub const fn agent_id(&self) -> Option<UserId> {
        self.agent_id
    }

    /// Inclusive lower bound on `created_at`.
    #[must_use]
    pub fn created_at_or_after(&self) -> Option<DateTime<Utc>> {
        self.created_from
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Exclusive upper bound on `created_at`: midnight after the end date.
    #[must_use]
    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.created_to
            .and_then(|date| date.succ_opt())
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Evaluates every predicate against `lead`.
    #[must_use]
    pub fn matches(&self, lead: &Lead) -> bool {
        self.matches_search(lead)
            && self.status.is_none_or(|status| lead.status() == Some(status))
            && self
                .final_status
                .is_none_or(|final_status| lead.final_status() == final_status)
            && self
                .agent_id
                .is_none_or(|agent| lead.agent_id() == Some(agent))
            && self
                .created_at_or_after()
                .is_none_or(|from| lead.created_at() >= from)
            && self
                .created_before()
                .is_none_or(|before| lead.created_at() < before)
    }

    fn matches_search(&self, lead: &Lead) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let needle = term.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        lead.name().is_some_and(contains)
            || contains(lead.mobile_no().as_str())
            || contains(lead.app_no().as_str())
    }
}

/// Sort order for lead listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeadOrdering {
    /// Most recently created first.
    #[default]
    NewestFirst,
    /// Open leads before closed ones, newest first within each group.
    OpenFirst,
}

impl LeadOrdering {
    /// Compares two leads under this ordering.
    #[must_use]
    pub fn compare(self, a: &Lead, b: &Lead) -> Ordering {
        let newest_first = b.created_at().cmp(&a.created_at());
        match self {
            Self::NewestFirst => newest_first,
            Self::OpenFirst => b.is_open().cmp(&a.is_open()).then(newest_first),
        }
    }
}

/// Offset/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    offset: u64,
    limit: u64,
}

impl PageRequest {
    /// Page size used when the caller does not choose one.
    pub const DEFAULT_LIMIT: u64 = 25;

    /// Creates a window from a raw offset and limit. A zero limit is
    /// replaced by [`Self::DEFAULT_LIMIT`].
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: if limit == 0 { Self::DEFAULT_LIMIT } else { limit },
        }
    }

    /// Creates the window for a one-based page number.
    #[must_use]
    pub const fn page(number: u64, size: u64) -> Self {
        let page_size = if size == 0 { Self::DEFAULT_LIMIT } else { size };
        Self::new(number.saturating_sub(1).saturating_mul(page_size), page_size)
    }

    /// Returns the number of leading rows skipped.
    #[must_use]
    pub const fn offset(self) -> u64 {
        self.offset
    }

    /// Returns the maximum number of rows returned.
    #[must_use]
    pub const fn limit(self) -> u64 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// A complete lead listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    /// Filter predicates.
    pub filter: LeadFilter,
    /// Sort order.
    pub ordering: LeadOrdering,
    /// Pagination window.
    pub page: PageRequest,
}

impl LeadQuery {
    /// Creates a query for the first default-sized page of `filter`.
    #[must_use]
    pub fn new(filter: LeadFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn ordered_by(mut self, ordering: LeadOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Sets the pagination window.
    #[must_use]
    pub const fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

/// One page of leads plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPage {
    /// Leads on this page.
    pub leads: Vec<Lead>,
    /// Number of leads matching the filter across all pages.
    pub total: u64,
}
