//! Given steps for board move BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use loanboard::{
    application::{domain::Application, ports::ApplicationRepository},
    lead::{
        domain::{AppNo, Lead, LeadAmount, MobileNumber, NewLead},
        ports::LeadRepository,
    },
};
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given("a board with one application of {amount:u64} under review")]
fn board_with_application(world: &mut BoardWorld, amount: u64) -> Result<(), eyre::Report> {
    let lead = Lead::new(
        NewLead {
            app_no: AppNo::new("BRD-1")?,
            name: Some("Nikhil Rao".to_owned()),
            mobile_no: MobileNumber::new("9200000001")?,
            amount: Some(LeadAmount::new(amount)?),
        },
        world.session.user_id(),
        &DefaultClock,
    );
    run_async(world.store.inner.store_many(std::slice::from_ref(&lead)))
        .wrap_err("store scenario lead")?;
    let application = Application::spawn_from_lead(&lead, &DefaultClock);
    run_async(world.store.inner.store(&application)).wrap_err("store scenario application")?;
    run_async(world.board.load()).wrap_err("load board")?;
    world.application_id = Some(application.id());
    Ok(())
}

#[given("the store rejects stage writes")]
fn store_rejects_writes(world: &mut BoardWorld) {
    world.store.reject_stage_writes();
}
