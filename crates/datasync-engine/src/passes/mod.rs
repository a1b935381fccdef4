//! One reconciliation pass per entity kind.
//!
//! Every pass materializes both extracts, walks the source rows in extract
//! order and issues at most one decision per row. Storage errors propagate
//! and abort the remainder of the pass; mutations already issued stand.

mod associations;
mod cascade;
mod components;
mod persons;
mod proposals;
mod session_types;
mod sessions;

use datasync_storage::{SourceCatalog, TargetCatalog};

use crate::engine::SyncOptions;

pub(crate) use associations::{reconcile_proposal_has_person, reconcile_session_has_person};
pub(crate) use components::reconcile_components;
pub(crate) use persons::reconcile_persons;
pub(crate) use proposals::reconcile_proposals;
pub(crate) use session_types::reconcile_session_types;
pub(crate) use sessions::reconcile_sessions;

/// Collaborators and options shared by every pass of a run.
#[derive(Clone, Copy)]
pub(crate) struct PassContext<'a> {
    pub source: &'a dyn SourceCatalog,
    pub target: &'a dyn TargetCatalog,
    pub options: &'a SyncOptions,
}
