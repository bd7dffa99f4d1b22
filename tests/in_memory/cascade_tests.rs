//! Cascading deletes and bulk reassignment across both contexts.

use crate::in_memory::helpers::{Desk, desk, import_leads, runtime};
use loanboard::{
    application::{domain::ApplicationFilter, ports::ApplicationRepository},
    lead::{
        domain::{LeadId, LeadQuery},
        ports::{LeadNoteRepository, LeadRepository, LeadRepositoryError},
        services::{LeadLifecycleError, UpdateLeadStatusRequest},
    },
    session::{Session, UserId},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::io;
use tokio::runtime::Runtime;

#[rstest]
fn deleting_leads_clears_notes_applications_and_board(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let ids: Vec<LeadId> = leads.iter().map(|lead| lead.id()).collect();
    for id in &ids {
        rt.block_on(desk.leads.add_note(&desk.agent, *id, "first call done"))
            .expect("note");
        rt.block_on(desk.leads.update_status(
            &desk.agent,
            UpdateLeadStatusRequest::new(*id, "banking received"),
        ))
        .expect("status update");
    }
    let mut board = desk.board(desk.agent);
    rt.block_on(board.load()).expect("board load");
    assert_eq!(board.cards().len(), 3);

    let deleted = rt
        .block_on(desk.leads.delete_leads(&desk.admin, &ids))
        .expect("delete");

    assert_eq!(deleted, 3);
    rt.block_on(board.refresh()).expect("board refresh");
    assert!(board.cards().is_empty());
    let remaining = rt
        .block_on(ApplicationRepository::list(&desk.store, &ApplicationFilter::new()))
        .expect("list applications");
    assert!(remaining.is_empty());
    for id in &ids {
        let notes = rt.block_on(desk.store.list_for_lead(*id)).expect("notes");
        assert!(notes.is_empty());
    }
}

#[rstest]
fn delete_with_unknown_id_removes_nothing(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let missing = LeadId::new();
    let mut ids: Vec<LeadId> = leads.iter().map(|lead| lead.id()).collect();
    ids.push(missing);

    let err = rt
        .block_on(desk.leads.delete_leads(&desk.admin, &ids))
        .expect_err("unknown id should fail the batch");

    assert!(matches!(
        err,
        LeadLifecycleError::Repository(LeadRepositoryError::NotFound(id)) if id == missing
    ));
    for lead in &leads {
        let found = rt
            .block_on(desk.leads.find(&desk.admin, lead.id()))
            .expect("lookup");
        assert!(found.is_some());
    }
}

#[rstest]
fn reassignment_hands_leads_to_the_new_agent(runtime: io::Result<Runtime>, desk: Desk) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let successor = Session::agent(UserId::new());
    let ids: Vec<LeadId> = leads.iter().take(2).map(|lead| lead.id()).collect();

    rt.block_on(desk.leads.assign_agent(&desk.admin, &ids, successor.user_id()))
        .expect("assign");

    let for_successor = rt
        .block_on(desk.leads.search(&successor, LeadQuery::default()))
        .expect("search");
    let for_original = rt
        .block_on(desk.leads.search(&desk.agent, LeadQuery::default()))
        .expect("search");
    assert_eq!(for_successor.total, 2);
    assert_eq!(for_original.total, 1);

    let spawned = rt
        .block_on(desk.leads.update_status(
            &successor,
            UpdateLeadStatusRequest::new(
                *ids.first().expect("first id"),
                "banking received",
            ),
        ))
        .expect("status update")
        .spawned
        .expect("application spawned");
    assert_eq!(spawned.agent_id(), Some(successor.user_id()));
}

#[rstest]
fn detail_write_from_an_earlier_read_keeps_the_new_agent(
    runtime: io::Result<Runtime>,
    desk: Desk,
) {
    let rt = runtime.expect("runtime creation");
    let leads = import_leads(&rt, &desk).expect("import");
    let lead_id = leads.first().map(|lead| lead.id()).expect("imported lead");
    let successor = UserId::new();

    let mut earlier = rt
        .block_on(LeadRepository::find_by_id(&desk.store, lead_id))
        .expect("lookup")
        .expect("lead exists");
    rt.block_on(desk.leads.assign_agent(&desk.admin, &[lead_id], successor))
        .expect("assign");
    earlier.rename(Some("Deepa Menon".to_owned()), &DefaultClock);
    rt.block_on(LeadRepository::update_details(&desk.store, &earlier))
        .expect("detail write");

    let stored = rt
        .block_on(LeadRepository::find_by_id(&desk.store, lead_id))
        .expect("lookup")
        .expect("lead exists");
    assert_eq!(stored.agent_id(), Some(successor));
    assert_eq!(stored.name(), Some("Deepa Menon"));
}
