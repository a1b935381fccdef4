use datasync_core::EntityKind;
use datasync_storage::{PersonFields, StorageResult};
use tracing::debug;

use super::cascade::seed_person_sessions;
use super::PassContext;
use crate::differ::diff_person;
use crate::matcher::find_match;
use crate::report::PassReport;

pub(crate) async fn reconcile_persons(ctx: PassContext<'_>) -> StorageResult<PassReport> {
    let mut report = PassReport::new(EntityKind::Persons);
    let source_rows = ctx.source.extract_persons().await?;
    let target_rows = ctx.target.extract_persons().await?;
    report.source_rows = source_rows.len();
    report.target_rows = target_rows.len();

    for row in &source_rows {
        // Target extracts only carry persons with a login.
        if row.login.is_none() {
            debug!(external_id = %row.external_id, "Skipping person without login");
            report.skipped += 1;
            continue;
        }

        let fields = PersonFields {
            external_id: row.external_id,
            login: row.login.clone(),
            title: row.title.clone(),
            given_name: row.given_name.clone(),
            family_name: row.family_name.clone(),
        };

        match find_match(row, &target_rows) {
            Some(found) => {
                let changes = diff_person(row, found.target);
                if changes.is_empty() {
                    report.unchanged += 1;
                    continue;
                }
                let person_id = found.target.person_id;
                ctx.target.update_person(person_id, &fields).await?;
                debug!(person_id, changes = %changes, "Updated person");
                report.updated += 1;
            }
            None => {
                let person_id = ctx.target.insert_person(&fields).await?;
                report.inserted += 1;

                let sessions = ctx
                    .source
                    .retrieve_sessions_for_person(&row.external_id)
                    .await?;
                let seeded = seed_person_sessions(ctx.target, person_id, sessions).await?;
                report.cascaded += seeded;
                debug!(person_id, sessions = seeded, "Inserted person");
            }
        }
    }

    Ok(report)
}
