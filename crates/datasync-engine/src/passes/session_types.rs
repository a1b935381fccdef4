use datasync_core::EntityKind;
use datasync_storage::StorageResult;
use tracing::debug;

use super::PassContext;
use crate::matcher::find_match;
use crate::report::PassReport;

/// Session types are only ever added; a pair already present is left alone.
pub(crate) async fn reconcile_session_types(ctx: PassContext<'_>) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::SessionTypes);
    let source_rows = ctx.source.extract_session_types().await?;
    let target_rows = ctx.target.extract_session_types().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    for row in &source_rows {
        if find_match(row, &target_rows).is_some() {
            report.unchanged += 1;
            continue;
        }
        let Some(session_id) = ctx
            .target
            .retrieve_session_id(&row.session_external_id)
            .await?
        else {
            debug!(visit = %row.visit_id, type_name = %row.type_name, "Not found: session for type");
            report.skipped += 1;
            continue;
        };
        ctx.target
            .insert_session_type(session_id, &row.type_name)
            .await?;
        debug!(visit = %row.visit_id, session_id, type_name = %row.type_name, "Inserted session type");
        report.inserted += 1;
    }

    Ok(report)
}
