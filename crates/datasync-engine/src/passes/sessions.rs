use datasync_core::{EntityKind, VisitName};
use datasync_storage::{DeleteOutcome, NewSession, SessionUpdate, StorageResult};
use tracing::{debug, warn};

use super::cascade::seed_session_participants;
use super::PassContext;
use crate::differ::{diff_session, whole_seconds};
use crate::matcher::find_match;
use crate::report::PassReport;

pub(crate) async fn reconcile_sessions(ctx: PassContext<'_>) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::Sessions);
    let source_rows = ctx.source.extract_sessions().await?;
    let target_rows = ctx.target.extract_sessions().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    for row in &source_rows {
        let scheduled = row.scheduled();

        let Some(found) = find_match(row, &target_rows) else {
            if row.state.is_terminal() {
                debug!(visit = %row.visit_id, state = %row.state, "Not inserting session");
                report.skipped += 1;
                continue;
            }
            let visit = match VisitName::parse(&row.visit_id) {
                Ok(visit) => visit,
                Err(e) => {
                    warn!(external_id = %row.external_id, error = %e, "Skipping session");
                    report.skipped += 1;
                    continue;
                }
            };
            let Some(proposal_id) = ctx
                .target
                .retrieve_proposal_id(&visit.proposal.code, visit.proposal.number)
                .await?
            else {
                debug!(visit = %row.visit_id, "Not found: proposal for new session");
                report.skipped += 1;
                continue;
            };

            let session_id = ctx
                .target
                .insert_session(&NewSession {
                    proposal_id,
                    visit_number: visit.visit_number,
                    external_id: row.external_id,
                    beamline: row.beamline.clone(),
                    comments: row.comments.clone(),
                    start_date: whole_seconds(row.start_date),
                    end_date: whole_seconds(row.end_date),
                    beamline_operator: row.beamline_operator.clone(),
                    scheduled,
                })
                .await?;
            report.inserted += 1;

            let participants = ctx
                .source
                .retrieve_persons_for_session(&row.external_id)
                .await?;
            let seeded = seed_session_participants(ctx.target, session_id, participants).await?;
            report.cascaded += seeded;
            debug!(visit = %row.visit_id, session_id, participants = seeded, "Inserted session");
            continue;
        };

        let session_id = found.target.session_id;
        if row.state.is_terminal() {
            if ctx.target.has_dependent_data(session_id).await? {
                warn!(visit = %row.visit_id, session_id, "Cancelled session has data, keeping it");
                report.retained += 1;
                continue;
            }
            match ctx.target.delete_session(session_id).await? {
                DeleteOutcome::Deleted => {
                    debug!(visit = %row.visit_id, session_id, "Deleted cancelled session");
                    report.deleted += 1;
                }
                DeleteOutcome::Retained => {
                    warn!(visit = %row.visit_id, session_id, "Cancelled session gained data, keeping it");
                    report.retained += 1;
                }
            }
            continue;
        }

        let changes = diff_session(row, found.target);
        if changes.is_empty() {
            report.unchanged += 1;
            continue;
        }
        ctx.target
            .update_session(
                session_id,
                &SessionUpdate {
                    external_id: row.external_id,
                    beamline: row.beamline.clone(),
                    start_date: whole_seconds(row.start_date),
                    end_date: whole_seconds(row.end_date),
                    beamline_operator: row.beamline_operator.clone(),
                    scheduled,
                },
            )
            .await?;
        debug!(visit = %row.visit_id, session_id, changes = %changes, "Updated session");
        report.updated += 1;
    }

    Ok(report)
}
