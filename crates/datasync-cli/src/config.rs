//! Application configuration.
//!
//! Loaded from a TOML file, with `DATASYNC__SECTION__KEY` environment
//! variables layered on top.

use std::path::PathBuf;

use datasync_core::EntityKind;
use datasync_db_mysql::MysqlConfig;
use datasync_engine::{DEFAULT_SESSION_PERSON_MIN_AGE_DAYS, SyncOptions};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[source] config::ConfigError),

    #[error("config deserialize error: {0}")]
    Deserialize(#[source] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: Option<SourceSettings>,
    #[serde(default)]
    pub target: Option<TargetSettings>,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lvl = self.logging.level.to_ascii_lowercase();
        if !VALID_LEVELS.contains(&lvl.as_str()) {
            return Err(ConfigError::invalid(format!(
                "logging.level must be one of {VALID_LEVELS:?}"
            )));
        }
        if self.sync.passes.is_empty() {
            return Err(ConfigError::invalid("sync.passes must name at least one pass"));
        }
        match &self.source {
            None => return Err(ConfigError::invalid("missing [source] section")),
            Some(SourceSettings::Fixture { path }) if path.as_os_str().is_empty() => {
                return Err(ConfigError::invalid("source.path must not be empty"));
            }
            Some(_) => {}
        }
        match &self.target {
            None => return Err(ConfigError::invalid("missing [target] section")),
            Some(TargetSettings::Mysql(mysql)) => mysql
                .validate()
                .map_err(|e| ConfigError::invalid(format!("target: {e}")))?,
            Some(TargetSettings::Memory) => {}
        }
        if self.sync.lock_file.as_os_str().is_empty() {
            return Err(ConfigError::invalid("sync.lock_file must not be empty"));
        }
        Ok(())
    }

    /// Applies command-line overrides. CLI values win over file and
    /// environment values.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(days) = cli.gt {
            self.sync.session_person_min_age_days = days;
        }
        if !cli.passes.is_empty() {
            self.sync.passes = cli.passes.clone();
        }
        if let Some(log) = &cli.log {
            self.logging.file = Some(log.clone());
        }
        self
    }
}

/// Where the upstream extracts come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    /// A TOML or JSON dataset file.
    Fixture { path: PathBuf },
}

/// Which downstream catalog receives the mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSettings {
    Mysql(MysqlConfig),
    /// Empty in-memory catalog; nothing is persisted.
    Memory,
}

impl TargetSettings {
    /// Human-readable target description, safe to log.
    pub fn describe(&self) -> String {
        match self {
            TargetSettings::Mysql(mysql) => mysql.display_url(),
            TargetSettings::Memory => "memory".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_min_age_days")]
    pub session_person_min_age_days: u32,
    #[serde(default = "default_passes")]
    pub passes: Vec<EntityKind>,
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

fn default_min_age_days() -> u32 {
    DEFAULT_SESSION_PERSON_MIN_AGE_DAYS
}
fn default_passes() -> Vec<EntityKind> {
    EntityKind::ALL.to_vec()
}
fn default_lock_file() -> PathBuf {
    PathBuf::from("/tmp/datasync.pid")
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            session_person_min_age_days: default_min_age_days(),
            passes: default_passes(),
            lock_file: default_lock_file(),
        }
    }
}

impl SyncSettings {
    pub fn options(&self) -> SyncOptions {
        SyncOptions::default().with_session_person_min_age_days(self.session_person_min_age_days)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append log output to this file instead of stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "debug".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::Path;

    /// Reads `path`, applies environment overrides, and validates the result.
    ///
    /// The file is required: a missing or unreadable file is an error.
    pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
        let cfg = Config::builder()
            .add_source(File::from(path).required(true))
            // e.g. DATASYNC__TARGET__POOL_SIZE=4
            .add_source(
                Environment::with_prefix("DATASYNC")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()
            .map_err(ConfigError::Build)?;
        let merged: AppConfig = cfg.try_deserialize().map_err(ConfigError::Deserialize)?;
        merged.validate()?;
        Ok(merged)
    }
}
