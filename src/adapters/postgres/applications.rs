//! Application repository over `PostgreSQL`.

use super::{
    conversion::{application_to_row, row_to_application, to_i64},
    models::ApplicationRow,
    repository::PostgresStore,
    schema::{applications, leads},
};
use crate::application::{
    domain::{Application, ApplicationCard, ApplicationFilter, ApplicationId, StageChange},
    ports::{ApplicationRepository, ApplicationRepositoryError, ApplicationRepositoryResult},
};
use crate::lead::domain::{LeadSummary, MobileNumber};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

#[async_trait]
impl ApplicationRepository for PostgresStore {
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let row = application_to_row(application).map_err(ApplicationRepositoryError::persistence)?;
        let id = application.id();
        let lead_id = application.lead_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(applications::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ApplicationRepositoryError::LeadNotFound(lead_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ApplicationRepositoryError::DuplicateApplication(id)
                    }
                    other => ApplicationRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> ApplicationRepositoryResult<Option<Application>> {
        self.run_blocking(move |connection| {
            let row = applications::table
                .find(id.into_inner())
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()
                .map_err(ApplicationRepositoryError::persistence)?;
            row.map(row_to_application)
                .transpose()
                .map_err(ApplicationRepositoryError::persistence)
        })
        .await
    }

    async fn list(
        &self,
        filter: &ApplicationFilter,
    ) -> ApplicationRepositoryResult<Vec<ApplicationCard>> {
        let agent = filter.agent_id();
        let stage = filter.stage();
        self.run_blocking(move |connection| {
            let mut query = applications::table.inner_join(leads::table).into_boxed();
            if let Some(agent_id) = agent {
                query = query.filter(applications::agent_id.eq(agent_id.into_inner()));
            }
            if let Some(wanted) = stage {
                query = query.filter(applications::stage.eq(wanted.as_str()));
            }
            let rows = query
                .order((applications::created_at.desc(), applications::id.asc()))
                .select((ApplicationRow::as_select(), (leads::name, leads::mobile_no)))
                .load::<(ApplicationRow, (Option<String>, String))>(connection)
                .map_err(ApplicationRepositoryError::persistence)?;

            rows.into_iter()
                .map(|(row, (name, mobile_no))| {
                    let application =
                        row_to_application(row).map_err(ApplicationRepositoryError::persistence)?;
                    let mobile = MobileNumber::new(mobile_no)
                        .map_err(ApplicationRepositoryError::persistence)?;
                    Ok(ApplicationCard::new(
                        application,
                        LeadSummary {
                            name,
                            mobile_no: mobile,
                        },
                    ))
                })
                .collect()
        })
        .await
    }

    async fn update_stage(
        &self,
        id: ApplicationId,
        change: &StageChange,
    ) -> ApplicationRepositoryResult<()> {
        let stage = change.to().as_str();
        let changed_at = change.changed_at();
        let disbursement = change
            .disbursement()
            .map(|captured| {
                to_i64("disbursed_amount", captured.amount.as_rupees().value())
                    .map(|amount| (amount, captured.disbursed_at))
            })
            .transpose()
            .map_err(ApplicationRepositoryError::persistence)?;

        self.run_blocking(move |connection| {
            let target = applications::table.find(id.into_inner());
            let updated = match disbursement {
                Some((amount, disbursed_at)) => diesel::update(target)
                    .set((
                        applications::stage.eq(stage),
                        applications::disbursed_amount.eq(Some(amount)),
                        applications::disbursed_date.eq(Some(disbursed_at)),
                        applications::updated_at.eq(changed_at),
                    ))
                    .execute(connection),
                None => diesel::update(target)
                    .set((
                        applications::stage.eq(stage),
                        applications::updated_at.eq(changed_at),
                    ))
                    .execute(connection),
            }
            .map_err(ApplicationRepositoryError::persistence)?;
            ensure_found(updated, id)
        })
        .await
    }

    async fn update_details(&self, application: &Application) -> ApplicationRepositoryResult<()> {
        let row = application_to_row(application).map_err(ApplicationRepositoryError::persistence)?;
        let id = application.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(applications::table.find(row.id))
                .set((
                    applications::loan_amount.eq(row.loan_amount),
                    applications::interest_rate_bp.eq(row.interest_rate_bp),
                    applications::tenure_months.eq(row.tenure_months),
                    applications::monthly_emi.eq(row.monthly_emi),
                    applications::notes.eq(row.notes),
                    applications::updated_at.eq(row.updated_at),
                ))
                .execute(connection)
                .map_err(ApplicationRepositoryError::persistence)?;
            ensure_found(updated, id)
        })
        .await
    }
}

fn ensure_found(updated: usize, id: ApplicationId) -> ApplicationRepositoryResult<()> {
    if updated == 0 {
        Err(ApplicationRepositoryError::NotFound(id))
    } else {
        Ok(())
    }
}
