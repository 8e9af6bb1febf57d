//! PostgreSQL pool, migrations and health.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::Config;

/// How long the health probe waits for `SELECT 1`.
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Create a PostgreSQL connection pool.
///
/// Waiting for a free connection is bounded by the query timeout.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(config.query_timeout)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    info!(
        max_connections = config.database_max_connections,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// Apply pending schema migrations from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to apply migrations")?;

    Ok(())
}

/// Whether PostgreSQL answers within the probe timeout.
pub async fn check_health(pool: &PgPool) -> bool {
    let probe = sqlx::query("SELECT 1").execute(pool);
    matches!(
        tokio::time::timeout(HEALTH_PROBE_TIMEOUT, probe).await,
        Ok(Ok(_))
    )
}
