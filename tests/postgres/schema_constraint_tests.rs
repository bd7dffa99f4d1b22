//! Check constraints enforced by the pipeline schema.

use crate::postgres::helpers::{PgHarness, pg};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rstest::rstest;
use uuid::Uuid;

fn insert_lead(
    pg: &PgHarness,
    status: Option<&str>,
    final_status: &str,
) -> Result<usize, DieselError> {
    let mut connection = pg.connect().expect("direct connection");
    diesel::sql_query(
        "INSERT INTO leads (id, app_no, mobile_no, status, final_status, \
         created_at, uploaded_at, updated_at) \
         VALUES ($1, 'HL-9001', '9876543299', $2, $3, now(), now(), now())",
    )
    .bind::<diesel::sql_types::Uuid, _>(Uuid::new_v4())
    .bind::<diesel::sql_types::Nullable<diesel::sql_types::Text>, _>(status)
    .bind::<diesel::sql_types::Text, _>(final_status)
    .execute(&mut connection)
}

fn assert_check_violation(result: Result<usize, DieselError>, constraint: &str) {
    match result {
        Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info)) => {
            assert_eq!(info.constraint_name(), Some(constraint));
        }
        other => panic!("expected check violation on {constraint}, got {other:?}"),
    }
}

#[rstest]
fn unknown_status_label_is_rejected(pg: PgHarness) {
    assert_check_violation(
        insert_lead(&pg, Some("call back later"), "open"),
        "leads_status_check",
    );
}

#[rstest]
#[case(Some("cibil issue"), "open")]
#[case(Some("banking received"), "close")]
#[case(None, "close")]
fn final_status_must_follow_status(
    pg: PgHarness,
    #[case] status: Option<&str>,
    #[case] final_status: &str,
) {
    assert_check_violation(
        insert_lead(&pg, status, final_status),
        "leads_final_status_derived",
    );
}

#[rstest]
#[case(None, "open")]
#[case(Some("banking received"), "open")]
#[case(Some("NI"), "close")]
#[case(Some("ring more than 3 days"), "close")]
fn consistent_status_pairs_are_accepted(
    pg: PgHarness,
    #[case] status: Option<&str>,
    #[case] final_status: &str,
) {
    let inserted = insert_lead(&pg, status, final_status).expect("insert");

    assert_eq!(inserted, 1);
}

#[rstest]
fn disbursed_stage_requires_an_amount(pg: PgHarness) {
    let lead = pg
        .seed_lead("HL-9002", "Asha Rao", "9876543298", Some(100_000))
        .expect("seed lead");
    let mut connection = pg.connect().expect("direct connection");

    let result = diesel::sql_query(
        "INSERT INTO applications (id, lead_id, stage, created_at, updated_at) \
         VALUES ($1, $2, 'Disbursed', now(), now())",
    )
    .bind::<diesel::sql_types::Uuid, _>(Uuid::new_v4())
    .bind::<diesel::sql_types::Uuid, _>(lead.id().into_inner())
    .execute(&mut connection);

    assert_check_violation(result, "applications_disbursed_requires_amount");
}
