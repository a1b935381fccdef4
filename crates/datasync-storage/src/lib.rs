//! # datasync-storage
//!
//! Catalog abstraction layer for datasync.
//!
//! This crate defines the two capability interfaces the reconciliation engine
//! talks to. It does not contain any implementations; those live in
//! `datasync-db-memory` and `datasync-db-mysql`.
//!
//! ## Example
//!
//! ```ignore
//! use datasync_storage::{StorageError, TargetCatalog};
//!
//! async fn proposal_id(target: &dyn TargetCatalog) -> Result<i64, StorageError> {
//!     target
//!         .retrieve_proposal_id("nt", 20)
//!         .await?
//!         .ok_or_else(|| StorageError::not_found("Proposal", "nt20"))
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{SourceCatalog, TargetCatalog};
pub use types::{
    DeleteOutcome, NewProposal, NewProtein, NewSession, PROTEIN_ORIGIN, PersonFields,
    ProposalPersonLink, ProposalUpdate, SessionPersonLink, SessionUpdate,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared source catalog handle.
pub type DynSource = std::sync::Arc<dyn SourceCatalog>;

/// Shared target catalog handle.
pub type DynTarget = std::sync::Arc<dyn TargetCatalog>;
