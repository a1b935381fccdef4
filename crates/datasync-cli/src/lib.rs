//! The `datasync` command: loads configuration, guards against concurrent
//! runs, and drives the reconciliation engine against the configured source
//! and target catalogs.

pub mod cli;
pub mod config;
pub mod lock;
pub mod observability;
pub mod run;
pub mod signals;

pub use cli::Cli;
pub use config::{AppConfig, ConfigError};
pub use run::{RunError, execute, run_until_signal};
