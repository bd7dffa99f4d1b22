//! Board state: card cache, drag gestures, optimistic updates and
//! reconciliation.

use super::{CommitReport, DropTarget, StageCommit, StageCommitter, resolve_drop_target};
use crate::application::{
    domain::{
        ApplicationCard, ApplicationFilter, ApplicationId, BoardSummary, DisbursedAmount,
        PipelineDomainError, Stage,
    },
    ports::{ApplicationRepository, ApplicationRepositoryError},
};
use crate::money::Rupees;
use crate::notice::{Notice, Notifier};
use crate::session::Session;
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Search applied to the cached cards before display and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSearch {
    /// Case-insensitive borrower name or mobile substring.
    pub term: String,
    /// Only show this stage, when set.
    pub stage: Option<Stage>,
}

impl BoardSearch {
    /// Returns `true` when the card passes the search.
    #[must_use]
    pub fn matches(&self, card: &ApplicationCard) -> bool {
        self.stage
            .is_none_or(|stage| card.application.stage() == stage)
            && card.matches_search(&self.term)
    }
}

/// A move into Disbursed waiting for the user to enter an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDisbursement {
    /// The application being disbursed.
    pub application_id: ApplicationId,
    /// Amount to prefill: a previous disbursed amount, else the loan amount.
    pub suggested_amount: Rupees,
}

/// What the board did with a drag-end gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing was being dragged or the target did not resolve.
    Discarded,
    /// The card was dropped in its own stage.
    Unchanged,
    /// The card has a commit in flight.
    Busy,
    /// The card was dropped on Disbursed; the cache is untouched until an
    /// amount is confirmed.
    AwaitingDisbursement(PendingDisbursement),
    /// The change is applied to the cache and must now be committed.
    Committing(StageCommit),
}

/// How a commit settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The write succeeded.
    Committed,
    /// The write failed and the cache was refetched.
    RolledBack,
    /// The write failed and so did the refetch; the cache is empty and
    /// marked stale.
    RolledBackStale,
}

/// Result of a programmatic move through [`KanbanBoard::move_card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The card is not on the board.
    Missing,
    /// The gesture resolved to no stage.
    Discarded,
    /// The target is the card's current stage.
    Unchanged,
    /// The card has a commit in flight.
    Busy,
    /// Disbursed was requested without an amount; nothing changed.
    AmountRequired,
    /// The supplied amount was rejected; nothing changed.
    InvalidAmount,
    /// A commit was written and settled.
    Settled(SettleOutcome),
}

/// Errors returned while confirming a pending disbursement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisbursementError {
    /// No move into Disbursed is waiting for an amount.
    #[error("no disbursement is pending")]
    NothingPending,
    /// The entered amount is not a positive number; the capture stays open.
    #[error(transparent)]
    InvalidAmount(PipelineDomainError),
    /// The card left the board or reached Disbursed while the amount was
    /// being entered.
    #[error("application {0} can no longer be disbursed from the board")]
    Stale(ApplicationId),
}

/// Interactive kanban board over the applications visible to a session.
pub struct KanbanBoard<A, N, C>
where
    A: ApplicationRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    session: Session,
    applications: Arc<A>,
    notifier: Arc<N>,
    clock: Arc<C>,
    cards: Vec<ApplicationCard>,
    search: BoardSearch,
    active_drag: Option<ApplicationId>,
    pending: Option<PendingDisbursement>,
    in_flight: HashSet<ApplicationId>,
    stale: bool,
}

impl<A, N, C> KanbanBoard<A, N, C>
where
    A: ApplicationRepository,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates an empty, stale board. Call [`Self::load`] before use.
    #[must_use]
    pub fn new(session: Session, applications: Arc<A>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            session,
            applications,
            notifier,
            clock,
            cards: Vec::new(),
            search: BoardSearch::default(),
            active_drag: None,
            pending: None,
            in_flight: HashSet::new(),
            stale: true,
        }
    }

    /// Loads the board from scratch, dropping any gesture in progress.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the read fails; a failure notice
    /// is delivered and the board is left empty and stale.
    pub async fn load(&mut self) -> Result<(), ApplicationRepositoryError> {
        self.active_drag = None;
        self.pending = None;
        self.refresh().await
    }

    /// Replaces the card cache with a fresh read of the store.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the read fails; a failure notice
    /// is delivered and the board is left empty and stale.
    pub async fn refresh(&mut self) -> Result<(), ApplicationRepositoryError> {
        let filter = ApplicationFilter::new().scoped_to(&self.session);
        match self.applications.list(&filter).await {
            Ok(cards) => {
                debug!(count = cards.len(), "board loaded");
                self.cards = cards;
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "board load failed");
                self.cards.clear();
                self.stale = true;
                self.notifier
                    .notify(Notice::remote_failure(format!("Could not load applications: {err}")));
                Err(err)
            }
        }
    }

    /// Starts dragging a card.
    ///
    /// Returns `false`, and records nothing, when the card is not on the
    /// board, has a commit in flight, or an amount capture is open.
    pub fn drag_start(&mut self, application_id: ApplicationId) -> bool {
        let allowed = self.pending.is_none()
            && !self.in_flight.contains(&application_id)
            && self.card(application_id).is_some();
        self.active_drag = allowed.then_some(application_id);
        allowed
    }

    /// Returns the card being dragged, for overlay rendering.
    #[must_use]
    pub fn active_card(&self) -> Option<&ApplicationCard> {
        self.active_drag.and_then(|id| self.card(id))
    }

    /// Finishes the current drag.
    ///
    /// `target` is the element under the pointer, or `None` when the card
    /// was released outside the board.
    pub fn drag_end(&mut self, target: Option<&DropTarget>) -> DragOutcome {
        let Some(application_id) = self.active_drag.take() else {
            return DragOutcome::Discarded;
        };
        let Some(resolution) = target.and_then(|drop| resolve_drop_target(drop, &self.cards))
        else {
            debug!(application_id = %application_id, "drop target did not resolve");
            return DragOutcome::Discarded;
        };
        let target_stage = resolution.stage();

        match self.begin_move(application_id, target_stage, None) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(application_id = %application_id, error = %err, "drop rejected");
                DragOutcome::Discarded
            }
        }
    }

    /// Returns the move waiting for a disbursed amount, if any.
    #[must_use]
    pub const fn pending_disbursement(&self) -> Option<&PendingDisbursement> {
        self.pending.as_ref()
    }

    /// Confirms the pending move into Disbursed with the entered amount and
    /// applies it to the cache.
    ///
    /// # Errors
    ///
    /// Returns [`DisbursementError::InvalidAmount`] for a non-positive or
    /// malformed amount, after delivering a validation notice; the capture
    /// stays open. Returns [`DisbursementError::NothingPending`] or
    /// [`DisbursementError::Stale`] when there is nothing to confirm.
    pub fn confirm_disbursement(&mut self, amount: &str) -> Result<StageCommit, DisbursementError> {
        let Some(pending) = self.pending else {
            return Err(DisbursementError::NothingPending);
        };
        let disbursed = match DisbursedAmount::parse(amount) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.notifier.notify(Notice::validation(err.to_string()));
                return Err(DisbursementError::InvalidAmount(err));
            }
        };
        self.pending = None;

        let application_id = pending.application_id;
        match self.begin_move(application_id, Stage::Disbursed, Some(disbursed)) {
            Ok(DragOutcome::Committing(commit)) => Ok(commit),
            Ok(_) | Err(_) => Err(DisbursementError::Stale(application_id)),
        }
    }

    /// Abandons the pending move into Disbursed. Returns `true` when one
    /// was pending.
    pub fn cancel_disbursement(&mut self) -> bool {
        let cancelled = self.pending.take();
        if let Some(pending) = cancelled {
            debug!(application_id = %pending.application_id, "disbursement cancelled");
        }
        cancelled.is_some()
    }

    /// Returns a committer for writing commits without borrowing the board.
    #[must_use]
    pub fn committer(&self) -> StageCommitter<A> {
        StageCommitter::new(Arc::clone(&self.applications))
    }

    /// Reconciles the board with the outcome of a commit.
    ///
    /// On success the change is re-applied to the cached card, which is a
    /// no-op unless a refresh replaced it meanwhile, and a success notice is
    /// delivered. On failure a failure notice is delivered, the cache is
    /// discarded and refetched; if the refetch fails too the board is left
    /// empty and stale.
    pub async fn settle(&mut self, report: CommitReport) -> SettleOutcome {
        let CommitReport { commit, result } = report;
        self.in_flight.remove(&commit.application_id);

        match result {
            Ok(()) => {
                if let Some(card) = self.card_mut(commit.application_id) {
                    card.application.apply_change(&commit.change);
                }
                info!(
                    application_id = %commit.application_id,
                    from = %commit.change.from(),
                    to = %commit.change.to(),
                    "board move committed"
                );
                self.notifier.notify(Notice::success(format!(
                    "Application moved to {}",
                    commit.change.to().label()
                )));
                SettleOutcome::Committed
            }
            Err(err) => {
                warn!(
                    application_id = %commit.application_id,
                    error = %err,
                    "board move failed, reloading"
                );
                self.notifier.notify(Notice::remote_failure(format!(
                    "Could not move application to {}: {err}",
                    commit.change.to().label()
                )));
                self.cards.clear();
                if self.refresh().await.is_ok() {
                    SettleOutcome::RolledBack
                } else {
                    SettleOutcome::RolledBackStale
                }
            }
        }
    }

    /// Moves a card without a drag gesture, as the detail dialog does, and
    /// waits for the commit to settle.
    ///
    /// `disbursed_amount` is required when `target` is Disbursed.
    pub async fn move_card(
        &mut self,
        application_id: ApplicationId,
        target: Stage,
        disbursed_amount: Option<&str>,
    ) -> MoveOutcome {
        let amount = match disbursed_amount.map(DisbursedAmount::parse).transpose() {
            Ok(parsed) => parsed,
            Err(err) => {
                self.notifier.notify(Notice::validation(err.to_string()));
                return MoveOutcome::InvalidAmount;
            }
        };
        if target.requires_disbursed_amount() && amount.is_none() {
            return if self.card(application_id).is_some_and(|card| card.application.stage() == target) {
                MoveOutcome::Unchanged
            } else {
                MoveOutcome::AmountRequired
            };
        }

        match self.begin_move(application_id, target, amount) {
            Ok(DragOutcome::Committing(commit)) => self.commit_and_settle(commit).await,
            Ok(DragOutcome::Unchanged) => MoveOutcome::Unchanged,
            Ok(DragOutcome::Busy) => MoveOutcome::Busy,
            Ok(DragOutcome::AwaitingDisbursement(_)) => MoveOutcome::AmountRequired,
            Ok(DragOutcome::Discarded) | Err(_) => MoveOutcome::Missing,
        }
    }

    /// Runs a whole drag gesture: start, drop on `target`, commit, settle.
    ///
    /// A drop on Disbursed leaves the amount capture open and returns
    /// [`MoveOutcome::AmountRequired`]; finish it with
    /// [`Self::disburse_pending`].
    pub async fn drop_card(
        &mut self,
        application_id: ApplicationId,
        target: Option<&DropTarget>,
    ) -> MoveOutcome {
        if !self.drag_start(application_id) {
            return if self.in_flight.contains(&application_id) || self.pending.is_some() {
                MoveOutcome::Busy
            } else {
                MoveOutcome::Missing
            };
        }
        match self.drag_end(target) {
            DragOutcome::Discarded => MoveOutcome::Discarded,
            DragOutcome::Unchanged => MoveOutcome::Unchanged,
            DragOutcome::Busy => MoveOutcome::Busy,
            DragOutcome::AwaitingDisbursement(_) => MoveOutcome::AmountRequired,
            DragOutcome::Committing(commit) => self.commit_and_settle(commit).await,
        }
    }

    /// Confirms the pending disbursement, commits it and settles.
    pub async fn disburse_pending(&mut self, amount: &str) -> MoveOutcome {
        match self.confirm_disbursement(amount) {
            Ok(commit) => self.commit_and_settle(commit).await,
            Err(DisbursementError::InvalidAmount(_)) => MoveOutcome::InvalidAmount,
            Err(DisbursementError::NothingPending | DisbursementError::Stale(_)) => {
                MoveOutcome::Missing
            }
        }
    }

    /// Sets the search term and stage filter.
    pub fn set_search(&mut self, search: BoardSearch) {
        self.search = search;
    }

    /// Returns the current search.
    #[must_use]
    pub const fn search(&self) -> &BoardSearch {
        &self.search
    }

    /// Returns every cached card.
    #[must_use]
    pub fn cards(&self) -> &[ApplicationCard] {
        &self.cards
    }

    /// Returns the cached cards that pass the search.
    #[must_use]
    pub fn visible_cards(&self) -> Vec<&ApplicationCard> {
        self.cards
            .iter()
            .filter(|card| self.search.matches(card))
            .collect()
    }

    /// Returns the visible cards of one stage.
    #[must_use]
    pub fn column(&self, stage: Stage) -> Vec<&ApplicationCard> {
        self.visible_cards()
            .into_iter()
            .filter(|card| card.application.stage() == stage)
            .collect()
    }

    /// Computes per-stage counts and totals over the visible cards.
    #[must_use]
    pub fn summary(&self) -> BoardSummary {
        BoardSummary::compute(
            self.visible_cards()
                .into_iter()
                .map(|card| &card.application),
        )
    }

    /// Returns `true` while a commit for the card is in flight.
    #[must_use]
    pub fn is_in_flight(&self, application_id: ApplicationId) -> bool {
        self.in_flight.contains(&application_id)
    }

    /// Returns `true` when the cache could not be loaded from the store.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    async fn commit_and_settle(&mut self, commit: StageCommit) -> MoveOutcome {
        let report = self.committer().commit(commit).await;
        MoveOutcome::Settled(self.settle(report).await)
    }

    /// Validates a move and, unless it needs an amount first, applies it to
    /// the cache and marks the card in flight.
    fn begin_move(
        &mut self,
        application_id: ApplicationId,
        target: Stage,
        amount: Option<DisbursedAmount>,
    ) -> Result<DragOutcome, PipelineDomainError> {
        if self.in_flight.contains(&application_id) {
            return Ok(DragOutcome::Busy);
        }
        let now = self.clock.utc();
        let Some(card) = self.card_mut(application_id) else {
            return Ok(DragOutcome::Discarded);
        };
        if card.application.stage() == target {
            debug!(application_id = %application_id, stage = %target, "drop on current stage");
            return Ok(DragOutcome::Unchanged);
        }
        if target.requires_disbursed_amount() && amount.is_none() {
            let suggested_amount = card
                .application
                .disbursed_amount()
                .unwrap_or_else(|| card.application.loan_amount());
            let pending = PendingDisbursement {
                application_id,
                suggested_amount,
            };
            self.pending = Some(pending);
            return Ok(DragOutcome::AwaitingDisbursement(pending));
        }

        let Some(change) = card.application.plan_transition(target, amount, now)? else {
            return Ok(DragOutcome::Unchanged);
        };
        card.application.apply_change(&change);
        self.in_flight.insert(application_id);
        Ok(DragOutcome::Committing(StageCommit {
            application_id,
            change,
        }))
    }

    fn card(&self, application_id: ApplicationId) -> Option<&ApplicationCard> {
        self.cards
            .iter()
            .find(|card| card.application.id() == application_id)
    }

    fn card_mut(&mut self, application_id: ApplicationId) -> Option<&mut ApplicationCard> {
        self.cards
            .iter_mut()
            .find(|card| card.application.id() == application_id)
    }
}
