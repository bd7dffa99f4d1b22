//! End-to-end flow from lead import to disbursement on the board.

use crate::in_memory::helpers::{Desk, desk, import_leads, runtime};
use loanboard::{
    application::{
        domain::{ApplicationFilter, Stage},
        services::TransitionApplicationRequest,
    },
    board::{DropTarget, MoveOutcome, SettleOutcome},
    lead::{
        domain::{FinalStatus, LeadFilter, LeadOrdering, LeadQuery, LeadStatus, PageRequest},
        services::UpdateLeadStatusRequest,
    },
    money::Rupees,
    notice::NoticeKind,
};
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
fn qualifying_lead_reaches_the_board_and_is_disbursed(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let deepa = leads.first().expect("first lead");

    let outcome = rt
        .block_on(desk.leads.update_status(
            &desk.agent,
            UpdateLeadStatusRequest::new(deepa.id(), "Banking Received"),
        ))
        .expect("status update");
    let application = outcome.spawned.expect("application spawned");

    let mut board = desk.board(desk.agent);
    rt.block_on(board.load()).expect("board load");
    assert_eq!(board.column(Stage::UnderReview).len(), 1);
    assert_eq!(
        board.summary().total_amount(Stage::UnderReview),
        Rupees::new(600_000)
    );

    let approved = rt.block_on(board.drop_card(application.id(), Some(&DropTarget::new("Approved"))));
    assert_eq!(approved, MoveOutcome::Settled(SettleOutcome::Committed));

    let awaiting =
        rt.block_on(board.drop_card(application.id(), Some(&DropTarget::new("Disbursed"))));
    assert_eq!(awaiting, MoveOutcome::AmountRequired);
    let disbursed = rt.block_on(board.disburse_pending("5,75,000"));
    assert_eq!(disbursed, MoveOutcome::Settled(SettleOutcome::Committed));

    let summary = board.summary();
    assert_eq!(summary.count(Stage::Disbursed), 1);
    assert_eq!(summary.total_amount(Stage::Disbursed), Rupees::new(575_000));
    assert_eq!(summary.count(Stage::UnderReview), 0);
    assert_eq!(
        desk.notifier.kinds(),
        vec![NoticeKind::Success, NoticeKind::Success]
    );
}

#[rstest]
fn service_and_board_agree_on_stage(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let arjun = leads.get(1).expect("second lead");
    let application = rt
        .block_on(desk.leads.update_status(
            &desk.admin,
            UpdateLeadStatusRequest::new(arjun.id(), "banking received"),
        ))
        .expect("status update")
        .spawned
        .expect("application spawned");

    rt.block_on(desk.pipeline.transition(
        &desk.agent,
        TransitionApplicationRequest::new(application.id(), "Rejected"),
    ))
    .expect("transition");

    let mut board = desk.board(desk.admin);
    rt.block_on(board.load()).expect("board load");
    assert_eq!(board.column(Stage::Reject).len(), 1);

    let cards = rt
        .block_on(desk.pipeline.list_cards(
            &desk.agent,
            ApplicationFilter::new().with_stage(Stage::Reject),
        ))
        .expect("list cards");
    assert_eq!(cards.len(), 1);
}

#[rstest]
fn lead_listing_orders_open_leads_first(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    for lead in leads.iter().take(2) {
        rt.block_on(desk.leads.update_status(
            &desk.agent,
            UpdateLeadStatusRequest::new(lead.id(), "NI"),
        ))
        .expect("status update");
    }

    let page = rt
        .block_on(desk.leads.search(
            &desk.agent,
            LeadQuery::new(LeadFilter::new())
                .ordered_by(LeadOrdering::OpenFirst)
                .with_page(PageRequest::page(1, 2)),
        ))
        .expect("search");

    assert_eq!(page.total, 3);
    assert_eq!(page.leads.len(), 2);
    assert_eq!(
        page.leads.first().map(|lead| lead.final_status()),
        Some(FinalStatus::Open)
    );

    let closed = rt
        .block_on(desk.leads.search(
            &desk.agent,
            LeadQuery::new(
                LeadFilter::new()
                    .with_status(LeadStatus::NotInterested)
                    .with_search("mehta"),
            ),
        ))
        .expect("search");
    assert_eq!(closed.total, 1);
}
