//! # datasync-engine
//!
//! Reconciliation engine for datasync.
//!
//! For every entity kind the engine reads the full source and target
//! extracts, pairs rows with the identity matcher, and decides per source row
//! whether to insert, update, delete or leave the target alone. Newly
//! inserted sessions and persons seed their participant associations in the
//! same pass.
//!
//! ## Example
//!
//! ```ignore
//! use datasync_core::EntityKind;
//! use datasync_engine::{Reconciler, SyncOptions};
//!
//! let reconciler = Reconciler::new(source, target).with_options(SyncOptions::default());
//! let report = reconciler.run(&EntityKind::ALL).await?;
//! println!("{} mutations", report.mutations());
//! ```

pub mod collapse;
pub mod differ;
pub mod engine;
pub mod error;
pub mod matcher;
mod passes;
pub mod report;

pub use collapse::collapse_consecutive;
pub use differ::{Changes, Field, FieldValue, ProposalDiff};
pub use engine::{DEFAULT_SESSION_PERSON_MIN_AGE_DAYS, Reconciler, SyncOptions};
pub use error::{ReconcileError, Result};
pub use matcher::{find_match, Match, MatchedBy, Matches};
pub use report::{PassReport, RunReport};
