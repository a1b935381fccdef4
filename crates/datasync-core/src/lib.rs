//! # datasync-core
//!
//! Record types and pure lookups shared by every datasync crate: external
//! identities, per-kind extract rows, lifecycle states, role translation and
//! natural-key parsing.

pub mod error;
pub mod id;
pub mod kind;
pub mod names;
pub mod records;
pub mod remote;
pub mod role;
pub mod state;

pub use error::{CoreError, Result};
pub use id::ExternalId;
pub use kind::EntityKind;
pub use names::{code_prefix, ProposalName, VisitName};
pub use records::{
    PersonSession, SessionParticipant, SourceComponent, SourcePerson, SourceProposal,
    SourceProposalPerson, SourceSession, SourceSessionPerson, SourceSessionType, TargetComponent,
    TargetPerson, TargetProposal, TargetProposalPerson, TargetSession, TargetSessionPerson,
    TargetSessionType,
};
pub use remote::RemoteFlag;
pub use role::{translate_role, TargetRole};
pub use state::LifecycleState;
