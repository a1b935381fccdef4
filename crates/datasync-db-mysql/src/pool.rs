//! Connection pool management for the MySQL target catalog.

use std::time::Duration;

use sqlx_core::pool::PoolOptions;
use sqlx_mysql::{MySql, MySqlPool};
use tracing::{debug, info, instrument};

use crate::config::MysqlConfig;
use crate::error::{MysqlError, Result};

/// Type alias for MySQL pool options.
pub type MySqlPoolOptions = PoolOptions<MySql>;

/// Creates a new MySQL connection pool from the given configuration.
#[instrument(skip(config), fields(url = %config.display_url()))]
pub async fn create_pool(config: &MysqlConfig) -> Result<MySqlPool> {
    info!(
        pool_size = config.pool_size,
        connect_timeout_ms = config.connect_timeout_ms,
        idle_timeout_ms = ?config.idle_timeout_ms,
        "Creating MySQL connection pool"
    );

    let connect_options = config.connect_options()?;

    let mut options = MySqlPoolOptions::new()
        .max_connections(config.pool_size)
        .min_connections(1)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .test_before_acquire(true);

    if let Some(idle_timeout) = config.idle_timeout_ms {
        options = options.idle_timeout(Duration::from_millis(idle_timeout));
    }

    let pool = options.connect_with(connect_options).await?;

    debug!("MySQL connection pool created successfully");

    Ok(pool)
}

/// Tests the connection to the database.
#[instrument(skip(pool))]
pub async fn test_connection(pool: &MySqlPool) -> Result<()> {
    sqlx_core::query::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(MysqlError::from)?;

    debug!("Database connection test successful");

    Ok(())
}

/// Masks the password in a database URL for logging.
pub(crate) fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@')
        && let Some(colon_pos) = url[..at_pos].rfind(':')
    {
        let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
        if colon_pos > scheme_end {
            return format!("{}:****{}", &url[..colon_pos], &url[at_pos..]);
        }
    }
    url.to_string()
}
