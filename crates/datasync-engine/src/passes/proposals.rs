use datasync_core::{EntityKind, ProposalName};
use datasync_storage::{NewProposal, ProposalUpdate, StorageResult};
use tracing::{debug, warn};

use super::PassContext;
use crate::differ::diff_proposal;
use crate::matcher::find_match;
use crate::report::PassReport;

pub(crate) async fn reconcile_proposals(ctx: PassContext<'_>) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::Proposals);
    let source_rows = ctx.source.extract_proposals().await?;
    let target_rows = ctx.target.extract_proposals().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    for row in &source_rows {
        let Some(found) = find_match(row, &target_rows) else {
            if row.state.is_terminal() {
                debug!(proposal = %row.name, state = %row.state, "Not inserting proposal");
                report.skipped += 1;
                continue;
            }
            let name = match ProposalName::parse(&row.name) {
                Ok(name) => name,
                Err(e) => {
                    warn!(external_id = %row.external_id, error = %e, "Skipping proposal");
                    report.skipped += 1;
                    continue;
                }
            };
            let proposal_id = ctx
                .target
                .insert_proposal(&NewProposal {
                    code: name.code,
                    number: name.number,
                    title: row.title.clone(),
                    external_id: row.external_id,
                })
                .await?;
            debug!(proposal = %row.name, proposal_id, "Inserted proposal");
            report.inserted += 1;
            continue;
        };

        let proposal_id = found.target.proposal_id;
        if row.state.is_terminal() {
            ctx.target.delete_proposal(proposal_id).await?;
            debug!(proposal = %row.name, proposal_id, "Deleted cancelled proposal");
            report.deleted += 1;
            continue;
        }

        let diff = diff_proposal(row, found.target);
        if diff.is_empty() {
            report.unchanged += 1;
            continue;
        }
        if let Some(code) = &diff.code_rename {
            ctx.target.update_proposal_code(proposal_id, code).await?;
            debug!(proposal = %row.name, proposal_id, code = %code, "Renamed proposal code");
        }
        if !diff.changes.is_empty() {
            ctx.target
                .update_proposal(
                    proposal_id,
                    &ProposalUpdate {
                        title: row.title.clone(),
                        external_id: row.external_id,
                    },
                )
                .await?;
            debug!(proposal = %row.name, proposal_id, changes = %diff.changes, "Updated proposal");
        }
        report.updated += 1;
    }

    Ok(report)
}
