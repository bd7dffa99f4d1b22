//! Given steps for lead status BDD scenarios.

use super::world::{LeadStatusWorld, run_async};
use eyre::WrapErr;
use loanboard::lead::services::{LeadDraft, UpdateLeadStatusRequest};
use rstest_bdd_macros::given;

#[given(r#"an agent lead "{app_no}" with mobile "{mobile}" asking for {amount:u64}"#)]
fn agent_lead(
    world: &mut LeadStatusWorld,
    app_no: String,
    mobile: String,
    amount: u64,
) -> Result<(), eyre::Report> {
    let draft = LeadDraft::new(app_no, mobile)
        .with_name("Scenario Lead")
        .with_amount(amount);
    let created = run_async(
        world
            .service
            .create_lead(&world.admin, draft, world.agent.user_id()),
    )
    .wrap_err("create lead for status scenario")?;
    world.lead = Some(created);
    Ok(())
}

#[given(r#"the lead status is already "{status}""#)]
fn lead_status_already(world: &mut LeadStatusWorld, status: String) -> Result<(), eyre::Report> {
    let lead_id = world.lead()?.id();
    let outcome = run_async(
        world
            .service
            .update_status(&world.agent, UpdateLeadStatusRequest::new(lead_id, status)),
    )
    .wrap_err("set initial lead status")?;
    world.lead = Some(outcome.lead);
    Ok(())
}
