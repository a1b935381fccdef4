//! Run orchestration.

use datasync_core::EntityKind;
use datasync_storage::{DynSource, DynTarget};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ReconcileError, Result};
use crate::passes::{self, PassContext};
use crate::report::{PassReport, RunReport};

/// Default age window of the session-has-person extracts, in days.
pub const DEFAULT_SESSION_PERSON_MIN_AGE_DAYS: u32 = 100;

/// Tunables of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Session participants are reconciled only for sessions that ended
    /// within this many days.
    #[serde(default = "default_min_age_days")]
    pub session_person_min_age_days: u32,
}

fn default_min_age_days() -> u32 {
    DEFAULT_SESSION_PERSON_MIN_AGE_DAYS
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            session_person_min_age_days: DEFAULT_SESSION_PERSON_MIN_AGE_DAYS,
        }
    }
}

impl SyncOptions {
    #[must_use]
    pub fn with_session_person_min_age_days(mut self, days: u32) -> Self {
        self.session_person_min_age_days = days;
        self
    }
}

/// Propagates the source catalog into the target catalog, one pass per
/// entity kind.
pub struct Reconciler {
    source: DynSource,
    target: DynTarget,
    options: SyncOptions,
}

impl Reconciler {
    pub fn new(source: DynSource, target: DynTarget) -> Self {
        Self {
            source,
            target,
            options: SyncOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Runs the given passes in order. The first failing pass aborts the
    /// run; earlier passes keep their effects.
    #[instrument(skip_all, fields(source = self.source.backend_name(), target = self.target.backend_name()))]
    pub async fn run(&self, kinds: &[EntityKind]) -> Result<RunReport> {
        let mut report = RunReport::new();
        for kind in kinds {
            report.push(self.run_pass(*kind).await?);
        }
        report.log();
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn run_pass(&self, kind: EntityKind) -> Result<PassReport> {
        let ctx = PassContext {
            source: self.source.as_ref(),
            target: self.target.as_ref(),
            options: &self.options,
        };
        let result = match kind {
            EntityKind::Proposals => passes::reconcile_proposals(ctx).await,
            EntityKind::Sessions => passes::reconcile_sessions(ctx).await,
            EntityKind::SessionTypes => passes::reconcile_session_types(ctx).await,
            EntityKind::Persons => passes::reconcile_persons(ctx).await,
            EntityKind::ProposalHasPerson => passes::reconcile_proposal_has_person(ctx).await,
            EntityKind::SessionHasPerson => passes::reconcile_session_has_person(ctx).await,
            EntityKind::Components => passes::reconcile_components(ctx).await,
        };

        match result {
            Ok(report) => {
                report.log();
                Ok(report)
            }
            Err(e) => {
                tracing::error!(kind = %kind, category = %e.category(), error = %e, "Pass aborted");
                Err(ReconcileError::storage(kind, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default_window() {
        assert_eq!(SyncOptions::default().session_person_min_age_days, 100);
        let parsed: SyncOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, SyncOptions::default());
        assert_eq!(
            SyncOptions::default()
                .with_session_person_min_age_days(7)
                .session_person_min_age_days,
            7
        );
    }
}
