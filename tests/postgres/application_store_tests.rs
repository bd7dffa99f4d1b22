//! Application persistence against `PostgreSQL`.

use crate::postgres::helpers::{PgHarness, pg};
use loanboard::{
    application::{
        domain::{Application, ApplicationFilter, DisbursedAmount, Stage},
        ports::{ApplicationRepository, ApplicationRepositoryError},
    },
    lead::{
        domain::{AppNo, Lead, MobileNumber, NewLead},
        ports::LeadRepository,
    },
    money::Rupees,
    session::UserId,
};
use mockable::DefaultClock;
use rstest::rstest;

fn reload(pg: &PgHarness, application: &Application) -> Application {
    pg.rt
        .block_on(ApplicationRepository::find_by_id(&pg.store, application.id()))
        .expect("lookup")
        .expect("application exists")
}

#[rstest]
fn disbursed_write_records_amount_and_date(pg: PgHarness) {
    let lead = pg
        .seed_lead("HL-5001", "Asha Rao", "9876543230", Some(450_000))
        .expect("seed lead");
    let mut application = pg.seed_application(&lead).expect("seed application");
    let amount = DisbursedAmount::new(425_000).expect("disbursed amount");
    let change = application
        .transition_to(Stage::Disbursed, Some(amount), &DefaultClock)
        .expect("transition")
        .expect("stage changed");

    pg.rt
        .block_on(pg.store.update_stage(application.id(), &change))
        .expect("stage write");

    let stored = reload(&pg, &application);
    assert_eq!(stored.stage(), Stage::Disbursed);
    assert_eq!(stored.disbursed_amount(), Some(Rupees::new(425_000)));
    let disbursed_at = stored.disbursed_date().expect("disbursed date");
    let expected_at = change.changed_at();
    assert_eq!(disbursed_at.timestamp_micros(), expected_at.timestamp_micros());
}

#[rstest]
fn plain_stage_write_leaves_disbursement_empty(pg: PgHarness) {
    let lead = pg
        .seed_lead("HL-5002", "Ravi Kumar", "9876543231", Some(200_000))
        .expect("seed lead");
    let mut application = pg.seed_application(&lead).expect("seed application");
    let change = application
        .transition_to(Stage::Approved, None, &DefaultClock)
        .expect("transition")
        .expect("stage changed");

    pg.rt
        .block_on(pg.store.update_stage(application.id(), &change))
        .expect("stage write");

    let stored = reload(&pg, &application);
    assert_eq!(stored.stage(), Stage::Approved);
    assert_eq!(stored.disbursed_amount(), None);
    assert_eq!(stored.disbursed_date(), None);
}

#[rstest]
fn stage_write_for_missing_application_is_not_found(pg: PgHarness) {
    let lead = pg
        .seed_lead("HL-5003", "Meera Nair", "9876543232", None)
        .expect("seed lead");
    let mut unsaved = Application::spawn_from_lead(&lead, &DefaultClock);
    let change = unsaved
        .transition_to(Stage::Reject, None, &DefaultClock)
        .expect("transition")
        .expect("stage changed");

    let err = pg
        .rt
        .block_on(pg.store.update_stage(unsaved.id(), &change))
        .expect_err("missing application");

    assert!(matches!(
        err,
        ApplicationRepositoryError::NotFound(id) if id == unsaved.id()
    ));
}

#[rstest]
fn storing_for_unknown_lead_is_rejected(pg: PgHarness) {
    let orphan = Lead::new(
        NewLead {
            app_no: AppNo::new("HL-5004").expect("app number"),
            name: Some("Nobody".to_owned()),
            mobile_no: MobileNumber::new("9876543233").expect("mobile number"),
            amount: None,
        },
        pg.agent,
        &DefaultClock,
    );
    let application = Application::spawn_from_lead(&orphan, &DefaultClock);

    let err = pg
        .rt
        .block_on(pg.store.store(&application))
        .expect_err("unknown lead");

    assert!(matches!(
        err,
        ApplicationRepositoryError::LeadNotFound(id) if id == orphan.id()
    ));
}

#[rstest]
fn listing_joins_lead_details_scoped_by_agent_and_stage(pg: PgHarness) {
    let own = pg
        .seed_lead("HL-5005", "Kavya Iyer", "9876543234", Some(600_000))
        .expect("seed lead");
    let other = pg
        .seed_lead("HL-5006", "Sunil Das", "9876543235", Some(700_000))
        .expect("seed lead");
    let other_agent = UserId::new();
    pg.rt
        .block_on(pg.store.assign_agent(&[other.id()], other_agent, chrono::Utc::now()))
        .expect("reassign");
    let other = pg
        .rt
        .block_on(LeadRepository::find_by_id(&pg.store, other.id()))
        .expect("lookup")
        .expect("lead exists");
    let mut own_application = pg.seed_application(&own).expect("seed application");
    pg.seed_application(&other).expect("seed application");
    let change = own_application
        .transition_to(Stage::Approved, None, &DefaultClock)
        .expect("transition")
        .expect("stage changed");
    pg.rt
        .block_on(pg.store.update_stage(own_application.id(), &change))
        .expect("stage write");

    let mine = pg
        .rt
        .block_on(ApplicationRepository::list(
            &pg.store,
            &ApplicationFilter::new().with_agent(pg.agent),
        ))
        .expect("list");
    let approved = pg
        .rt
        .block_on(ApplicationRepository::list(
            &pg.store,
            &ApplicationFilter::new().with_stage(Stage::Approved),
        ))
        .expect("list");
    let under_review = pg
        .rt
        .block_on(ApplicationRepository::list(
            &pg.store,
            &ApplicationFilter::new().with_stage(Stage::UnderReview),
        ))
        .expect("list");

    assert_eq!(mine.len(), 1);
    let card = mine.first().expect("own card");
    assert_eq!(card.application.id(), own_application.id());
    assert_eq!(card.lead.name.as_deref(), Some("Kavya Iyer"));
    assert_eq!(card.lead.mobile_no.as_str(), "9876543234");
    assert_eq!(approved.len(), 1);
    assert_eq!(under_review.len(), 1);
    let waiting = under_review.first().expect("other card");
    assert_eq!(waiting.application.agent_id(), Some(other_agent));
    assert_eq!(waiting.lead.name.as_deref(), Some("Sunil Das"));
}
