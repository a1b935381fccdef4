mod common;

use common::*;
use datasync_core::EntityKind;
use datasync_db_memory::{Mutation, SourceDataset};
use datasync_engine::ReconcileError;
use datasync_storage::{ErrorCategory, NewProposal, TargetCatalog};

#[tokio::test]
async fn test_failing_pass_stops_run_and_keeps_earlier_passes() {
    let harness = Harness::new(full_dataset());
    harness.target.fail_mutations_after(1).await;

    let err = harness
        .reconciler
        .run(&EntityKind::ALL)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Storage {
            kind: EntityKind::Sessions,
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Infrastructure);
    assert_eq!(
        harness.target.journal().await,
        vec![Mutation::InsertProposal(NewProposal {
            code: "nt".into(),
            number: 20,
            title: Some("Software testing".into()),
            external_id: id(PROPOSAL),
        })]
    );
    let target = &harness.target;
    assert_eq!(target.extract_proposals().await.unwrap().len(), 1);
    assert!(target.extract_sessions().await.unwrap().is_empty());
    assert!(target.extract_persons().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failure_mid_pass_skips_remaining_rows() {
    let harness = Harness::new(SourceDataset {
        proposals: vec![
            proposal("nt20", PROPOSAL, "Open"),
            proposal("mx21", OTHER_PROPOSAL, "Open"),
        ],
        ..Default::default()
    });
    harness.target.fail_mutations_after(1).await;

    let err = harness
        .reconciler
        .run(&[EntityKind::Proposals, EntityKind::Sessions])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), EntityKind::Proposals);
    let journal = harness.target.journal().await;
    assert_eq!(journal.len(), 1);
    assert!(matches!(&journal[0], Mutation::InsertProposal(p) if p.code == "nt"));
    let stored = harness.target.extract_proposals().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].external_id, Some(id(PROPOSAL)));
}

#[tokio::test]
async fn test_rerun_after_failure_completes_the_remainder() {
    let harness = Harness::new(full_dataset());
    harness.target.fail_mutations_after(1).await;
    harness
        .reconciler
        .run(&EntityKind::ALL)
        .await
        .unwrap_err();

    harness.target.fail_mutations_after(usize::MAX).await;
    let report = harness.reconciler.run(&EntityKind::ALL).await.unwrap();

    assert_eq!(report.pass(EntityKind::Proposals).unwrap().unchanged, 1);
    assert_eq!(report.pass(EntityKind::Sessions).unwrap().inserted, 2);
    assert_eq!(
        harness
            .target
            .extract_components()
            .await
            .unwrap()
            .len(),
        1
    );
}
