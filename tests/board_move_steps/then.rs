//! Then steps for board move BDD scenarios.

use super::world::{BoardWorld, run_async};
use loanboard::{
    application::{domain::Stage, ports::ApplicationRepository},
    money::Rupees,
};
use rstest_bdd_macros::then;

#[then("the board asks for a disbursed amount suggesting {amount:u64}")]
fn board_asks_for_amount(world: &BoardWorld, amount: u64) -> Result<(), eyre::Report> {
    let pending = world
        .board
        .pending_disbursement()
        .ok_or_else(|| eyre::eyre!("no disbursement is pending"))?;

    if pending.suggested_amount != Rupees::new(amount) {
        return Err(eyre::eyre!(
            "expected suggestion {}, found {}",
            Rupees::new(amount),
            pending.suggested_amount
        ));
    }
    Ok(())
}

#[then(r#"the card stage is "{stage}""#)]
fn card_stage_is(world: &BoardWorld, stage: String) -> Result<(), eyre::Report> {
    let expected = Stage::try_from(stage.as_str())
        .map_err(|err| eyre::eyre!("invalid expected stage in scenario: {err}"))?;
    let application_id = world.application_id()?;
    let card = world
        .board
        .cards()
        .iter()
        .find(|card| card.application.id() == application_id)
        .ok_or_else(|| eyre::eyre!("card {application_id} is not on the board"))?;

    if card.application.stage() != expected {
        return Err(eyre::eyre!(
            "expected stage {expected}, found {}",
            card.application.stage()
        ));
    }
    Ok(())
}

#[then("the stored disbursed amount is {amount:u64}")]
fn stored_disbursed_amount(world: &BoardWorld, amount: u64) -> Result<(), eyre::Report> {
    let application_id = world.application_id()?;
    let stored = run_async(ApplicationRepository::find_by_id(
        &world.store.inner,
        application_id,
    ))?
    .ok_or_else(|| eyre::eyre!("application {application_id} missing from store"))?;

    if stored.disbursed_amount() != Some(Rupees::new(amount)) {
        return Err(eyre::eyre!(
            "expected disbursed amount {amount}, found {:?}",
            stored.disbursed_amount()
        ));
    }
    Ok(())
}

#[then("no notice is shown")]
fn no_notice(world: &BoardWorld) -> Result<(), eyre::Report> {
    let notices = world.notifier.notices();
    if notices.is_empty() {
        Ok(())
    } else {
        Err(eyre::eyre!("expected no notices, found {notices:?}"))
    }
}

#[then(r#"a "{kind}" notice is shown"#)]
fn notice_is_shown(world: &BoardWorld, kind: String) -> Result<(), eyre::Report> {
    let kinds = world.notifier.kinds();
    if kinds.iter().any(|shown| shown.as_str() == kind) {
        Ok(())
    } else {
        Err(eyre::eyre!("expected a {kind} notice, found {kinds:?}"))
    }
}
