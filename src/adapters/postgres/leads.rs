//! Lead and note repositories over `PostgreSQL`.

use super::{
    conversion::{lead_to_row, note_to_row, row_to_lead, row_to_note, to_i64},
    models::{LeadNoteRow, LeadRow},
    repository::{PostgresStore, in_transaction},
    schema::{lead_notes, leads},
};
use crate::lead::{
    domain::{
        AppNo, Lead, LeadFilter, LeadId, LeadNote, LeadOrdering, LeadPage, LeadQuery,
        MobileNumber, StatusChange,
    },
    ports::{LeadNoteRepository, LeadRepository, LeadRepositoryError, LeadRepositoryResult},
};
use crate::session::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashSet;
use uuid::Uuid;

#[async_trait]
impl LeadRepository for PostgresStore {
    async fn store_many(&self, leads: &[Lead]) -> LeadRepositoryResult<()> {
        if let Some(duplicate) = batch_duplicate(leads) {
            return Err(duplicate);
        }
        let rows = leads
            .iter()
            .map(lead_to_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(LeadRepositoryError::persistence)?;
        let first_id = leads.first().map(Lead::id);

        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                let app_nos: Vec<&str> = rows.iter().map(|row| row.app_no.as_str()).collect();
                let mobiles: Vec<&str> = rows.iter().map(|row| row.mobile_no.as_str()).collect();
                // Reports the colliding key; the unique constraints still guard the insert.
                let existing = conflicting_rows(tx, &app_nos, &mobiles)?;
                if let Some(conflict) = existing.first() {
                    return Err(duplicate_key_error(conflict, &rows));
                }

                diesel::insert_into(leads::table)
                    .values(&rows)
                    .execute(tx)
                    .map_err(|err| match (err, first_id) {
                        (
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info),
                            Some(id),
                        ) if info.constraint_name() == Some("leads_pkey") => {
                            LeadRepositoryError::DuplicateLead(id)
                        }
                        (other, _) => LeadRepositoryError::persistence(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>> {
        self.run_blocking(move |connection| {
            let row = leads::table
                .find(id.into_inner())
                .select(LeadRow::as_select())
                .first::<LeadRow>(connection)
                .optional()
                .map_err(LeadRepositoryError::persistence)?;
            row.map(row_to_lead)
                .transpose()
                .map_err(LeadRepositoryError::persistence)
        })
        .await
    }

    async fn find_conflicts(
        &self,
        app_nos: &[AppNo],
        mobiles: &[MobileNumber],
    ) -> LeadRepositoryResult<Vec<Lead>> {
        let app_no_keys: Vec<String> = app_nos.iter().map(ToString::to_string).collect();
        let mobile_keys: Vec<String> = mobiles.iter().map(ToString::to_string).collect();
        self.run_blocking(move |connection| {
            let app_no_refs: Vec<&str> = app_no_keys.iter().map(String::as_str).collect();
            let mobile_refs: Vec<&str> = mobile_keys.iter().map(String::as_str).collect();
            conflicting_rows(connection, &app_no_refs, &mobile_refs)?
                .into_iter()
                .map(row_to_lead)
                .collect::<Result<Vec<_>, _>>()
                .map_err(LeadRepositoryError::persistence)
        })
        .await
    }

    async fn list(&self, query: &LeadQuery) -> LeadRepositoryResult<LeadPage> {
        let filter = query.filter.clone();
        let ordering = query.ordering;
        let offset = to_i64("offset", query.page.offset()).map_err(LeadRepositoryError::persistence)?;
        let limit = to_i64("limit", query.page.limit()).map_err(LeadRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            let total = filtered(&filter)
                .count()
                .get_result::<i64>(connection)
                .map_err(LeadRepositoryError::persistence)?;

            let ordered = match ordering {
                LeadOrdering::NewestFirst => filtered(&filter).order((
                    leads::created_at.desc(),
                    leads::id.asc(),
                )),
                LeadOrdering::OpenFirst => filtered(&filter).order((
                    leads::final_status.desc(),
                    leads::created_at.desc(),
                    leads::id.asc(),
                )),
            };
            let rows = ordered
                .offset(offset)
                .limit(limit)
                .select(LeadRow::as_select())
                .load::<LeadRow>(connection)
                .map_err(LeadRepositoryError::persistence)?;

            let page = rows
                .into_iter()
                .map(row_to_lead)
                .collect::<Result<Vec<_>, _>>()
                .map_err(LeadRepositoryError::persistence)?;
            Ok(LeadPage {
                leads: page,
                total: u64::try_from(total).unwrap_or_default(),
            })
        })
        .await
    }

    async fn update_status(&self, id: LeadId, change: &StatusChange) -> LeadRepositoryResult<()> {
        let status = change.status().as_str();
        let final_status = change.final_status().as_str();
        let changed_at = change.changed_at();
        self.run_blocking(move |connection| {
            let updated = diesel::update(leads::table.find(id.into_inner()))
                .set((
                    leads::status.eq(Some(status)),
                    leads::final_status.eq(final_status),
                    leads::updated_at.eq(changed_at),
                ))
                .execute(connection)
                .map_err(LeadRepositoryError::persistence)?;
            ensure_found(updated, id)
        })
        .await
    }

    async fn update_details(&self, lead: &Lead) -> LeadRepositoryResult<()> {
        let row = lead_to_row(lead).map_err(LeadRepositoryError::persistence)?;
        let id = lead.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(leads::table.find(row.id))
                .set((
                    leads::name.eq(row.name),
                    leads::amount.eq(row.amount),
                    leads::updated_at.eq(row.updated_at),
                ))
                .execute(connection)
                .map_err(LeadRepositoryError::persistence)?;
            ensure_found(updated, id)
        })
        .await
    }

    async fn assign_agent(
        &self,
        ids: &[LeadId],
        agent_id: UserId,
        assigned_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<()> {
        let requested = ids.to_vec();
        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                let keys = require_all(tx, &requested)?;
                diesel::update(leads::table.filter(leads::id.eq_any(keys)))
                    .set((
                        leads::agent_id.eq(Some(agent_id.into_inner())),
                        leads::updated_at.eq(assigned_at),
                    ))
                    .execute(tx)
                    .map_err(LeadRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }

    async fn delete_many(&self, ids: &[LeadId]) -> LeadRepositoryResult<u64> {
        let requested = ids.to_vec();
        self.run_blocking(move |connection| {
            in_transaction(connection, |tx| {
                let keys = require_all(tx, &requested)?;
                // Notes and applications go with their lead via ON DELETE CASCADE.
                let deleted = diesel::delete(leads::table.filter(leads::id.eq_any(keys)))
                    .execute(tx)
                    .map_err(LeadRepositoryError::persistence)?;
                Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
            })
        })
        .await
    }
}

#[async_trait]
impl LeadNoteRepository for PostgresStore {
    async fn append(&self, note: &LeadNote) -> LeadRepositoryResult<()> {
        let row = note_to_row(note);
        let lead_id = note.lead_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(lead_notes::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        LeadRepositoryError::NotFound(lead_id)
                    }
                    other => LeadRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_for_lead(&self, lead_id: LeadId) -> LeadRepositoryResult<Vec<LeadNote>> {
        self.run_blocking(move |connection| {
            let rows = lead_notes::table
                .filter(lead_notes::lead_id.eq(lead_id.into_inner()))
                .order((lead_notes::created_at.desc(), lead_notes::id.desc()))
                .select(LeadNoteRow::as_select())
                .load::<LeadNoteRow>(connection)
                .map_err(LeadRepositoryError::persistence)?;
            rows.into_iter()
                .map(row_to_note)
                .collect::<Result<Vec<_>, _>>()
                .map_err(LeadRepositoryError::persistence)
        })
        .await
    }
}

fn filtered(filter: &LeadFilter) -> leads::BoxedQuery<'static, Pg> {
    let mut query = leads::table.into_boxed();
    if let Some(term) = filter.search() {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            leads::name
                .assume_not_null()
                .ilike(pattern.clone())
                .or(leads::mobile_no.ilike(pattern.clone()))
                .or(leads::app_no.ilike(pattern)),
        );
    }
    if let Some(status) = filter.status() {
        query = query.filter(leads::status.eq(status.as_str()));
    }
    if let Some(final_status) = filter.final_status() {
        query = query.filter(leads::final_status.eq(final_status.as_str()));
    }
    if let Some(agent) = filter.agent_id() {
        query = query.filter(leads::agent_id.eq(agent.into_inner()));
    }
    if let Some(from) = filter.created_at_or_after() {
        query = query.filter(leads::created_at.ge(from));
    }
    if let Some(before) = filter.created_before() {
        query = query.filter(leads::created_at.lt(before));
    }
    query
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn conflicting_rows(
    connection: &mut PgConnection,
    app_nos: &[&str],
    mobiles: &[&str],
) -> LeadRepositoryResult<Vec<LeadRow>> {
    leads::table
        .filter(
            leads::app_no
                .eq_any(app_nos.to_vec())
                .or(leads::mobile_no.eq_any(mobiles.to_vec())),
        )
        .select(LeadRow::as_select())
        .load::<LeadRow>(connection)
        .map_err(LeadRepositoryError::persistence)
}

fn duplicate_key_error(existing: &LeadRow, incoming: &[LeadRow]) -> LeadRepositoryError {
    let app_no_taken = incoming.iter().any(|row| row.app_no == existing.app_no);
    let parsed = if app_no_taken {
        AppNo::new(existing.app_no.as_str()).map(LeadRepositoryError::DuplicateAppNo)
    } else {
        MobileNumber::new(existing.mobile_no.as_str()).map(LeadRepositoryError::DuplicateMobile)
    };
    parsed.unwrap_or_else(LeadRepositoryError::persistence)
}

fn batch_duplicate(leads: &[Lead]) -> Option<LeadRepositoryError> {
    let mut ids = HashSet::new();
    let mut app_nos = HashSet::new();
    let mut mobiles = HashSet::new();
    leads.iter().find_map(|lead| {
        if !ids.insert(lead.id()) {
            Some(LeadRepositoryError::DuplicateLead(lead.id()))
        } else if !app_nos.insert(lead.app_no()) {
            Some(LeadRepositoryError::DuplicateAppNo(lead.app_no().clone()))
        } else if !mobiles.insert(lead.mobile_no()) {
            Some(LeadRepositoryError::DuplicateMobile(lead.mobile_no().clone()))
        } else {
            None
        }
    })
}

/// Locks and checks every requested lead, returning their keys. Fails with
/// the first missing lead in request order.
fn require_all(
    connection: &mut PgConnection,
    requested: &[LeadId],
) -> LeadRepositoryResult<Vec<Uuid>> {
    let keys: Vec<Uuid> = requested.iter().map(|id| id.into_inner()).collect();
    let found: HashSet<Uuid> = leads::table
        .filter(leads::id.eq_any(keys.clone()))
        .select(leads::id)
        .for_update()
        .load::<Uuid>(connection)
        .map_err(LeadRepositoryError::persistence)?
        .into_iter()
        .collect();
    if let Some(missing) = requested
        .iter()
        .find(|id| !found.contains(&id.into_inner()))
    {
        return Err(LeadRepositoryError::NotFound(*missing));
    }
    Ok(keys)
}

fn ensure_found(updated: usize, id: LeadId) -> LeadRepositoryResult<()> {
    if updated == 0 {
        Err(LeadRepositoryError::NotFound(id))
    } else {
        Ok(())
    }
}
