mod common;

use common::*;
use datasync_core::{EntityKind, LifecycleState};
use datasync_storage::TargetCatalog;

#[tokio::test]
async fn test_second_run_issues_no_mutations() {
    let harness = Harness::new(full_dataset());

    let first = harness.reconciler.run(&EntityKind::ALL).await.unwrap();
    assert!(first.mutations() > 0);
    assert_eq!(first.passes.len(), EntityKind::ALL.len());
    let sessions = first.pass(EntityKind::Sessions).unwrap();
    assert_eq!(sessions.inserted, 2);
    assert_eq!(sessions.cascaded, 2);
    harness.target.take_journal().await;

    let second = harness.reconciler.run(&EntityKind::ALL).await.unwrap();
    assert_eq!(second.mutations(), 0);
    assert!(harness.target.journal().await.is_empty());
}

#[tokio::test]
async fn test_first_run_populates_every_table() {
    let harness = Harness::new(full_dataset());

    harness.reconciler.run(&EntityKind::ALL).await.unwrap();

    let target = &harness.target;
    assert_eq!(target.extract_proposals().await.unwrap().len(), 1);
    assert_eq!(target.extract_sessions().await.unwrap().len(), 2);
    assert_eq!(target.extract_persons().await.unwrap().len(), 2);
    assert_eq!(target.extract_session_types().await.unwrap().len(), 1);
    assert_eq!(target.extract_proposal_has_person().await.unwrap().len(), 2);
    assert_eq!(target.extract_session_has_person(100).await.unwrap().len(), 2);
    assert_eq!(target.extract_components().await.unwrap().len(), 1);

    let queued = target
        .extract_sessions()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.visit_id == "nt20-2")
        .unwrap();
    assert_eq!(queued.scheduled, Some(false));
}

#[tokio::test]
async fn test_selected_passes_run_in_given_order() {
    let harness = Harness::new(full_dataset());

    let report = harness
        .reconciler
        .run(&[EntityKind::Sessions, EntityKind::Proposals])
        .await
        .unwrap();

    // Sessions ran before their proposal existed.
    assert_eq!(report.pass(EntityKind::Sessions).unwrap().skipped, 2);
    assert_eq!(report.pass(EntityKind::Proposals).unwrap().inserted, 1);
    assert_eq!(report.passes[0].kind, EntityKind::Sessions);
}

#[tokio::test]
async fn test_upstream_cancellation_between_runs_deletes_proposal() {
    let harness = Harness::new(full_dataset());
    harness
        .reconciler
        .run(&[EntityKind::Proposals])
        .await
        .unwrap();
    harness.target.take_journal().await;

    let mut cancelled = full_dataset();
    cancelled.proposals[0].state = LifecycleState::Cancelled;
    harness.source.replace(cancelled).await;

    let report = harness
        .reconciler
        .run(&[EntityKind::Proposals])
        .await
        .unwrap();

    assert_eq!(report.pass(EntityKind::Proposals).unwrap().deleted, 1);
    let journal = harness.target.journal().await;
    assert_eq!(journal.len(), 1);
    assert!(journal[0].is_delete());
    assert!(harness.target.extract_proposals().await.unwrap().is_empty());
}
