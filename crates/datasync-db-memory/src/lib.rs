//! In-memory catalogs for datasync.
//!
//! [`FixtureSource`] serves a source dataset loaded from a TOML or JSON file
//! and stands in for the upstream catalog in dry runs and tests.
//! [`InMemoryTarget`] models the downstream tables and journals every
//! mutation call so callers can assert on exactly what the engine issued.
//!
//! # Example
//!
//! ```ignore
//! use datasync_db_memory::{FixtureSource, InMemoryTarget};
//!
//! let source = FixtureSource::from_path("demos/fixture.toml")?;
//! let target = InMemoryTarget::new();
//! ```

pub mod fixture;
pub mod journal;
pub mod source;
pub mod target;

pub use fixture::{FixtureError, SourceDataset};
pub use journal::Mutation;
pub use source::FixtureSource;
pub use target::InMemoryTarget;
