use datasync_core::{EntityKind, SourceComponent, TargetComponent};
use datasync_storage::{NewProtein, StorageResult};
use tracing::debug;

use super::PassContext;
use crate::differ::fill_empty_name;
use crate::matcher::{find_match, MatchedBy};
use crate::report::PassReport;

/// Reconciles source components against target proteins.
///
/// Only `Accepted` components are active. Proteins are never deleted: a
/// component that leaves `Accepted` is unlinked by clearing the protein's
/// external id. Acronyms are never overwritten and names only fill a blank.
pub(crate) async fn reconcile_components(ctx: PassContext<'_>) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::Components);
    let source_rows = ctx.source.extract_components().await?;
    let target_rows = ctx.target.extract_components().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    for row in &source_rows {
        let accepted = row.state.is_accepted();
        let changed = match find_match(row, &target_rows) {
            Some(found) if found.by == MatchedBy::ExternalId => {
                refresh_linked(ctx, row, found.target, accepted).await?
            }
            Some(found) => {
                if !accepted {
                    false
                } else if ctx.target.count_proteins_for_external_id(&row.external_id).await? != 0 {
                    debug!(component = %row.external_id, "Component already linked to another protein");
                    false
                } else {
                    link_protein(ctx, row, found.target).await?;
                    true
                }
            }
            None if accepted => {
                if insert_protein(ctx, row).await? {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
                continue;
            }
            None => {
                report.skipped += 1;
                continue;
            }
        };

        if changed {
            report.updated += 1;
        } else {
            report.unchanged += 1;
        }
    }

    Ok(report)
}

async fn refresh_linked(
    ctx: PassContext<'_>,
    row: &SourceComponent,
    protein: &TargetComponent,
    accepted: bool,
) -> StorageResult<bool> {
    let mut changed = false;
    if !accepted {
        ctx.target
            .update_protein_external_id(protein.protein_id, None)
            .await?;
        debug!(protein_id = protein.protein_id, state = %row.state, "Unlinked protein");
        changed = true;
    }
    if let Some(name) = fill_empty_name(row, protein) {
        ctx.target
            .update_protein_name(protein.protein_id, name)
            .await?;
        debug!(protein_id = protein.protein_id, name, "Filled protein name");
        changed = true;
    }
    Ok(changed)
}

async fn link_protein(
    ctx: PassContext<'_>,
    row: &SourceComponent,
    protein: &TargetComponent,
) -> StorageResult<()> {
    ctx.target
        .update_protein_external_id(protein.protein_id, Some(&row.external_id))
        .await?;
    debug!(protein_id = protein.protein_id, component = %row.external_id, "Linked protein");
    if let Some(name) = fill_empty_name(row, protein) {
        ctx.target
            .update_protein_name(protein.protein_id, name)
            .await?;
    }
    Ok(())
}

/// Returns `false` when the proposal already has a protein with the acronym
/// or the proposal is not in the target.
async fn insert_protein(ctx: PassContext<'_>, row: &SourceComponent) -> StorageResult<bool> {
    let existing = ctx
        .target
        .count_proteins_for_proposal_and_acronym(&row.proposal_external_id, &row.acronym)
        .await?;
    if existing != 0 {
        debug!(acronym = %row.acronym, proposal = %row.proposal_external_id, "Acronym already taken in proposal");
        return Ok(false);
    }
    let Some(proposal_id) = ctx
        .target
        .retrieve_proposal_id_for_external_id(&row.proposal_external_id)
        .await?
    else {
        debug!(proposal = %row.proposal_external_id, "Not found: proposal for component");
        return Ok(false);
    };
    let protein_id = ctx
        .target
        .insert_protein(&NewProtein {
            proposal_id,
            external_id: row.external_id,
            name: row.name.clone(),
            acronym: row.acronym.clone(),
        })
        .await?;
    debug!(protein_id, acronym = %row.acronym, "Inserted protein");
    Ok(true)
}
