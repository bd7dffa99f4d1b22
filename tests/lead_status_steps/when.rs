//! When steps for lead status BDD scenarios.

use super::world::{LeadStatusWorld, run_async};
use loanboard::lead::services::UpdateLeadStatusRequest;
use rstest_bdd_macros::when;

#[when(r#"the agent sets the lead status to "{status}""#)]
fn set_lead_status(world: &mut LeadStatusWorld, status: String) -> Result<(), eyre::Report> {
    let lead_id = world.lead()?.id();
    let result = run_async(
        world
            .service
            .update_status(&world.agent, UpdateLeadStatusRequest::new(lead_id, status)),
    );
    if let Ok(ref outcome) = result {
        world.lead = Some(outcome.lead.clone());
    }
    world.last_result = Some(result);
    Ok(())
}
