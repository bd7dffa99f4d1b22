//! Application aggregate root and the guarded stage transition.

use super::{ApplicationId, PipelineDomainError, Stage};
use crate::lead::domain::{Lead, LeadId};
use crate::money::Rupees;
use crate::session::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive amount released when an application is disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisbursedAmount(Rupees);

impl DisbursedAmount {
    /// Creates a validated disbursed amount.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidDisbursedAmount`] for zero.
    pub fn new(value: u64) -> Result<Self, PipelineDomainError> {
        if value == 0 {
            return Err(PipelineDomainError::InvalidDisbursedAmount(value.to_string()));
        }
        Ok(Self(Rupees::new(value)))
    }

    /// Parses user input such as `95000`, `95,000` or `₹95,000`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::InvalidDisbursedAmount`] unless the
    /// input is a positive whole number of rupees.
    pub fn parse(input: &str) -> Result<Self, PipelineDomainError> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('₹')
            .chars()
            .filter(|ch| *ch != ',')
            .collect();
        let value = cleaned
            .trim()
            .parse::<u64>()
            .map_err(|_| PipelineDomainError::InvalidDisbursedAmount(input.to_owned()))?;
        if value == 0 {
            return Err(PipelineDomainError::InvalidDisbursedAmount(input.to_owned()));
        }
        Ok(Self(Rupees::new(value)))
    }

    /// Returns the amount.
    #[must_use]
    pub const fn as_rupees(self) -> Rupees {
        self.0
    }
}

/// Amount and time captured when an application enters Disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disbursement {
    /// Amount released.
    pub amount: DisbursedAmount,
    /// When the funds were released.
    pub disbursed_at: DateTime<Utc>,
}

/// Annual interest rate held in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestRate(u32);

impl InterestRate {
    /// Creates a rate from basis points (1050 is 10.50%).
    #[must_use]
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }
}

impl TryFrom<&str> for InterestRate {
    type Error = PipelineDomainError;

    /// Parses a percentage with at most two decimals, e.g. `10.5` or `9.25%`.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || PipelineDomainError::InvalidInterestRate(value.to_owned());
        let normalized = value.trim().trim_end_matches('%').trim_end();
        let (whole, fraction) = normalized.split_once('.').unwrap_or((normalized, ""));
        let is_digits = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());
        if whole.is_empty() || fraction.len() > 2 || !is_digits(whole) || !is_digits(fraction) {
            return Err(invalid());
        }

        let whole_points = whole
            .parse::<u32>()
            .ok()
            .and_then(|percent| percent.checked_mul(100))
            .ok_or_else(invalid)?;
        let fraction_points = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u32>().map_err(|_| invalid())?.saturating_mul(10),
            _ => fraction.parse::<u32>().map_err(|_| invalid())?,
        };
        whole_points
            .checked_add(fraction_points)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0.div_euclid(100), self.0.rem_euclid(100))
    }
}

/// A validated stage transition, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    from: Stage,
    to: Stage,
    disbursement: Option<Disbursement>,
    changed_at: DateTime<Utc>,
}

impl StageChange {
    /// Returns the stage the application is leaving.
    #[must_use]
    pub const fn from(&self) -> Stage {
        self.from
    }

    /// Returns the stage the application is entering.
    #[must_use]
    pub const fn to(&self) -> Stage {
        self.to
    }

    /// Returns the captured disbursement when entering Disbursed.
    #[must_use]
    pub const fn disbursement(&self) -> Option<Disbursement> {
        self.disbursement
    }

    /// Returns the time of the change.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

/// Free-form fields editable from the application detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationEdit {
    /// Loan amount.
    pub loan_amount: Rupees,
    /// Annual interest rate.
    pub interest_rate: Option<InterestRate>,
    /// Loan tenure in months.
    pub tenure_months: Option<u32>,
    /// Monthly instalment.
    pub monthly_emi: Option<Rupees>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Loan application aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    id: ApplicationId,
    lead_id: LeadId,
    agent_id: Option<UserId>,
    stage: Stage,
    loan_amount: Rupees,
    interest_rate: Option<InterestRate>,
    tenure_months: Option<u32>,
    monthly_emi: Option<Rupees>,
    disbursed_amount: Option<Rupees>,
    disbursed_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted application identifier.
    pub id: ApplicationId,
    /// Owning lead.
    pub lead_id: LeadId,
    /// Agent copied from the lead at spawn time.
    pub agent_id: Option<UserId>,
    /// Pipeline stage.
    pub stage: Stage,
    /// Loan amount.
    pub loan_amount: Rupees,
    /// Annual interest rate.
    pub interest_rate: Option<InterestRate>,
    /// Loan tenure in months.
    pub tenure_months: Option<u32>,
    /// Monthly instalment.
    pub monthly_emi: Option<Rupees>,
    /// Amount released on disbursement.
    pub disbursed_amount: Option<Rupees>,
    /// Time of disbursement.
    pub disbursed_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Spawns a new application from a lead that reached the qualifying
    /// status. The loan amount and agent are copied from the lead.
    #[must_use]
    pub fn spawn_from_lead(lead: &Lead, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ApplicationId::new(),
            lead_id: lead.id(),
            agent_id: lead.agent_id(),
            stage: Stage::UnderReview,
            loan_amount: lead.amount().map_or(Rupees::ZERO, |amount| amount.as_rupees()),
            interest_rate: None,
            tenure_months: None,
            monthly_emi: None,
            disbursed_amount: None,
            disbursed_date: None,
            notes: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            lead_id: data.lead_id,
            agent_id: data.agent_id,
            stage: data.stage,
            loan_amount: data.loan_amount,
            interest_rate: data.interest_rate,
            tenure_months: data.tenure_months,
            monthly_emi: data.monthly_emi,
            disbursed_amount: data.disbursed_amount,
            disbursed_date: data.disbursed_date,
            notes: data.notes,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the owning lead.
    #[must_use]
    pub const fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Returns the agent copied from the lead.
    #[must_use]
    pub const fn agent_id(&self) -> Option<UserId> {
        self.agent_id
    }

    /// Returns the pipeline stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the loan amount.
    #[must_use]
    pub const fn loan_amount(&self) -> Rupees {
        self.loan_amount
    }

    /// Returns the annual interest rate.
    #[must_use]
    pub const fn interest_rate(&self) -> Option<InterestRate> {
        self.interest_rate
    }

    /// Returns the tenure in months.
    #[must_use]
    pub const fn tenure_months(&self) -> Option<u32> {
        self.tenure_months
    }

    /// Returns the monthly instalment.
    #[must_use]
    pub const fn monthly_emi(&self) -> Option<Rupees> {
        self.monthly_emi
    }

    /// Returns the disbursed amount, if one was ever captured.
    #[must_use]
    pub const fn disbursed_amount(&self) -> Option<Rupees> {
        self.disbursed_amount
    }

    /// Returns the disbursement time, if one was ever captured.
    #[must_use]
    pub const fn disbursed_date(&self) -> Option<DateTime<Utc>> {
        self.disbursed_date
    }

    /// Returns the free-text notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Amount this application contributes to its board column total:
    /// the disbursed amount in Disbursed, the loan amount elsewhere.
    #[must_use]
    pub fn board_amount(&self) -> Rupees {
        match self.stage {
            Stage::Disbursed => self.disbursed_amount.unwrap_or_default(),
            Stage::UnderReview | Stage::Approved | Stage::Reject => self.loan_amount,
        }
    }

    /// Validates a move to `target` without applying it.
    ///
    /// Returns `Ok(None)` when `target` is the current stage. Any stage may
    /// move to any other, except that entering Disbursed requires
    /// `disbursed_amount`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DisbursedAmountRequired`] when the
    /// target is Disbursed and no amount was supplied.
    pub fn plan_transition(
        &self,
        target: Stage,
        disbursed_amount: Option<DisbursedAmount>,
        at: DateTime<Utc>,
    ) -> Result<Option<StageChange>, PipelineDomainError> {
        if target == self.stage {
            return Ok(None);
        }

        let disbursement = if target.requires_disbursed_amount() {
            let amount =
                disbursed_amount.ok_or(PipelineDomainError::DisbursedAmountRequired(self.id))?;
            Some(Disbursement {
                amount,
                disbursed_at: at,
            })
        } else {
            None
        };

        Ok(Some(StageChange {
            from: self.stage,
            to: target,
            disbursement,
            changed_at: at,
        }))
    }

    /// Validates and applies a move to `target`.
    ///
    /// Returns the applied change, or `None` for a same-stage no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineDomainError::DisbursedAmountRequired`] when the
    /// target is Disbursed and no amount was supplied; the application is
    /// left unchanged.
    pub fn transition_to(
        &mut self,
        target: Stage,
        disbursed_amount: Option<DisbursedAmount>,
        clock: &impl Clock,
    ) -> Result<Option<StageChange>, PipelineDomainError> {
        let change = self.plan_transition(target, disbursed_amount, clock.utc())?;
        if let Some(applied) = change.as_ref() {
            self.apply_change(applied);
        }
        Ok(change)
    }

    /// Applies a previously planned change.
    ///
    /// Disbursement fields are only ever set, never cleared, by a change.
    pub fn apply_change(&mut self, change: &StageChange) {
        self.stage = change.to;
        if let Some(disbursement) = change.disbursement {
            self.disbursed_amount = Some(disbursement.amount.as_rupees());
            self.disbursed_date = Some(disbursement.disbursed_at);
        }
        self.updated_at = change.changed_at;
    }

    /// Replaces the free-form detail fields.
    pub fn edit(&mut self, edit: ApplicationEdit, clock: &impl Clock) {
        let ApplicationEdit {
            loan_amount,
            interest_rate,
            tenure_months,
            monthly_emi,
            notes,
        } = edit;
        self.loan_amount = loan_amount;
        self.interest_rate = interest_rate;
        self.tenure_months = tenure_months;
        self.monthly_emi = monthly_emi;
        self.notes = notes
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        self.updated_at = clock.utc();
    }
}
