//! Process orchestration: configuration, logging, lock file, collaborators,
//! and the reconciliation run itself.

use std::sync::Arc;

use anyhow::Context;
use datasync_db_memory::{FixtureSource, InMemoryTarget};
use datasync_db_mysql::IspybTarget;
use datasync_engine::{Reconciler, RunReport};
use datasync_storage::{DynSource, DynTarget};

use crate::cli::Cli;
use crate::config::{AppConfig, ConfigError, SourceSettings, TargetSettings, loader};
use crate::lock::{LockError, LockFile};
use crate::observability;
use crate::signals::shutdown_signal;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Interrupted by {0}")]
    Interrupted(&'static str),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(_) => 2,
            RunError::Lock(LockError::Held(_)) => 3,
            RunError::Lock(LockError::Io { .. }) => 1,
            RunError::Interrupted(_) | RunError::Failed(_) => 1,
        }
    }
}

/// The opened target catalog. Kept concrete so the MySQL pool can be closed.
enum Target {
    Mysql(Arc<IspybTarget>),
    Memory(Arc<InMemoryTarget>),
}

impl Target {
    async fn open(settings: &TargetSettings) -> anyhow::Result<Self> {
        match settings {
            TargetSettings::Mysql(mysql) => {
                let target = IspybTarget::new(mysql.clone())
                    .await
                    .with_context(|| format!("opening target {}", settings.describe()))?;
                Ok(Target::Mysql(Arc::new(target)))
            }
            TargetSettings::Memory => Ok(Target::Memory(Arc::new(InMemoryTarget::new()))),
        }
    }

    fn catalog(&self) -> DynTarget {
        match self {
            Target::Mysql(target) => Arc::clone(target) as DynTarget,
            Target::Memory(target) => Arc::clone(target) as DynTarget,
        }
    }

    async fn close(&self) {
        if let Target::Mysql(target) = self {
            target.close().await;
        }
    }
}

fn open_source(settings: &SourceSettings) -> anyhow::Result<DynSource> {
    match settings {
        SourceSettings::Fixture { path } => {
            let source = FixtureSource::from_path(path)
                .with_context(|| format!("opening source fixture {}", path.display()))?;
            let source: DynSource = Arc::new(source);
            Ok(source)
        }
    }
}

/// Runs the configured passes, stopping early on Ctrl-C or SIGTERM.
///
/// Mutations applied before an interruption are not rolled back.
pub async fn run_until_signal(config: &AppConfig) -> Result<RunReport, RunError> {
    let (Some(source_settings), Some(target_settings)) = (&config.source, &config.target) else {
        return Err(ConfigError::Invalid("missing [source] or [target] section".into()).into());
    };

    let source = open_source(source_settings)?;
    let target = Target::open(target_settings).await?;
    tracing::info!(
        target = %target_settings.describe(),
        passes = ?config.sync.passes,
        "Starting run"
    );

    let reconciler =
        Reconciler::new(source, target.catalog()).with_options(config.sync.options());
    let outcome = tokio::select! {
        result = reconciler.run(&config.sync.passes) => result
            .context("reconciliation failed")
            .map_err(RunError::Failed),
        signal = shutdown_signal() => {
            tracing::warn!(signal, "Shutdown signal received, abandoning run");
            Err(RunError::Interrupted(signal))
        }
    };

    target.close().await;
    outcome
}

/// Loads configuration, takes the lock, and runs. Returns the exit code.
pub fn execute(cli: &Cli) -> i32 {
    let config = match loader::load_config(&cli.conf) {
        Ok(config) => config.with_cli_overrides(cli),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return RunError::from(e).exit_code();
        }
    };

    if let Err(e) = observability::init_tracing(&config.logging) {
        eprintln!("Configuration error: cannot open log file: {e}");
        return 2;
    }

    let lock = match LockFile::acquire(&config.sync.lock_file) {
        Ok(lock) => lock,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start");
            return RunError::from(e).exit_code();
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build async runtime");
            return 1;
        }
    };

    let outcome = runtime.block_on(run_until_signal(&config));
    drop(lock);

    match outcome {
        Ok(report) => {
            tracing::info!(mutations = report.mutations(), "Done");
            0
        }
        Err(e) => {
            tracing::error!("Run failed: {e:#}");
            e.exit_code()
        }
    }
}
