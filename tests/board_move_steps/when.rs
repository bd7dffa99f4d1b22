//! When steps for board move BDD scenarios.

use super::world::{BoardWorld, run_async};
use loanboard::board::DropTarget;
use rstest_bdd_macros::when;

#[when(r#"the card is dropped on the "{column}" column"#)]
fn card_dropped(world: &mut BoardWorld, column: String) -> Result<(), eyre::Report> {
    let application_id = world.application_id()?;
    let target = DropTarget::new(column);
    let outcome = run_async(world.board.drop_card(application_id, Some(&target)));
    world.last_outcome = Some(outcome);
    Ok(())
}

#[when(r#"the disbursed amount "{amount}" is confirmed"#)]
fn amount_confirmed(world: &mut BoardWorld, amount: String) {
    let outcome = run_async(world.board.disburse_pending(&amount));
    world.last_outcome = Some(outcome);
}

#[when("the disbursement is cancelled")]
fn disbursement_cancelled(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    if world.board.cancel_disbursement() {
        Ok(())
    } else {
        Err(eyre::eyre!("no disbursement was pending"))
    }
}
