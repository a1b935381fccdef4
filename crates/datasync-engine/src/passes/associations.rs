//! Pair-keyed association passes.
//!
//! Source extracts are sorted by the pair, so duplicate pairs are adjacent
//! and collapse to the first row. Associations have no natural key; an
//! unmatched pair resolves both parents by external id and is skipped when
//! either has not been synced yet.

use datasync_core::{translate_role, EntityKind, RemoteFlag};
use datasync_storage::{ProposalPersonLink, SessionPersonLink, StorageResult};
use tracing::debug;

use super::PassContext;
use crate::collapse::collapse_consecutive;
use crate::differ::{diff_proposal_person, diff_session_person};
use crate::matcher::find_match;
use crate::report::PassReport;

pub(crate) async fn reconcile_proposal_has_person(
    ctx: PassContext<'_>,
) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::ProposalHasPerson);
    let source_rows = ctx.source.extract_proposal_has_person().await?;
    let target_rows = ctx.target.extract_proposal_has_person().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    let rows = collapse_consecutive(source_rows, |r| {
        (r.proposal_external_id, r.person_external_id)
    });
    report.collapsed = (report.source_rows - rows.len()) as u32;

    for row in &rows {
        if let Some(found) = find_match(row, &target_rows) {
            let changes = diff_proposal_person(row, found.target);
            if changes.is_empty() {
                report.unchanged += 1;
                continue;
            }
            ctx.target
                .update_proposal_has_person(&ProposalPersonLink {
                    proposal_id: found.target.proposal_id,
                    person_id: found.target.person_id,
                    role: translate_role(&row.role),
                })
                .await?;
            debug!(
                proposal_id = found.target.proposal_id,
                person_id = found.target.person_id,
                changes = %changes,
                "Updated proposal participant"
            );
            report.updated += 1;
            continue;
        }

        let proposal_id = ctx
            .target
            .retrieve_proposal_id_for_external_id(&row.proposal_external_id)
            .await?;
        let person_id = ctx
            .target
            .retrieve_person_id(&row.person_external_id)
            .await?;
        let (Some(proposal_id), Some(person_id)) = (proposal_id, person_id) else {
            debug!(
                proposal = %row.proposal_external_id,
                person = %row.person_external_id,
                proposal_found = proposal_id.is_some(),
                person_found = person_id.is_some(),
                "Not found: parent of proposal participant"
            );
            report.skipped += 1;
            continue;
        };
        ctx.target
            .insert_proposal_has_person(&ProposalPersonLink {
                proposal_id,
                person_id,
                role: translate_role(&row.role),
            })
            .await?;
        debug!(proposal_id, person_id, "Inserted proposal participant");
        report.inserted += 1;
    }

    Ok(report)
}

pub(crate) async fn reconcile_session_has_person(
    ctx: PassContext<'_>,
) -> StorageResult<PassReport> {
    let min_age_days = ctx.options.session_person_min_age_days;
    let mut report = PassReport::new(EntityKind::SessionHasPerson);
    let source_rows = ctx.source.extract_session_has_person(min_age_days).await?;
    let target_rows = ctx.target.extract_session_has_person(min_age_days).await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    let rows = collapse_consecutive(source_rows, |r| {
        (r.session_external_id, r.person_external_id)
    });
    report.collapsed = (report.source_rows - rows.len()) as u32;

    for row in &rows {
        let role = translate_role(&row.role);
        let remote = RemoteFlag::from_source_on_site(row.on_site);

        if let Some(found) = find_match(row, &target_rows) {
            let changes = diff_session_person(row, found.target);
            if changes.is_empty() {
                report.unchanged += 1;
                continue;
            }
            ctx.target
                .update_session_has_person(&SessionPersonLink {
                    session_id: found.target.session_id,
                    person_id: found.target.person_id,
                    role,
                    remote,
                })
                .await?;
            debug!(
                session_id = found.target.session_id,
                person_id = found.target.person_id,
                changes = %changes,
                "Updated session participant"
            );
            report.updated += 1;
            continue;
        }

        let session_id = ctx
            .target
            .retrieve_session_id(&row.session_external_id)
            .await?;
        let person_id = ctx
            .target
            .retrieve_person_id(&row.person_external_id)
            .await?;
        let (Some(session_id), Some(person_id)) = (session_id, person_id) else {
            debug!(
                session = %row.session_external_id,
                person = %row.person_external_id,
                session_found = session_id.is_some(),
                person_found = person_id.is_some(),
                "Not found: parent of session participant"
            );
            report.skipped += 1;
            continue;
        };
        ctx.target
            .insert_session_has_person(&SessionPersonLink {
                session_id,
                person_id,
                role,
                remote,
            })
            .await?;
        debug!(session_id, person_id, "Inserted session participant");
        report.inserted += 1;
    }

    Ok(report)
}
