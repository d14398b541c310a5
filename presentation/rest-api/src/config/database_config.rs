use persistence::db::{DatabaseConfig, create_postgres_pool, run_migrations};
use sqlx::PgPool;
use std::env;

use super::positive_or;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config.missing_database_url")]
    MissingDatabaseUrl,
}

/// Initialize database connection pool from environment variables
///
/// Environment variables:
/// - DATABASE_URL: PostgreSQL connection string (required)
/// - DATABASE_MAX_CONNECTIONS: Pool size (default: 5)
/// - MIGRATIONS_PATH: Directory holding SQL migrations (default: "./migrations")
///
/// # Errors
/// Returns error if DATABASE_URL is not set, the connection fails or migrations fail
pub async fn init_database() -> anyhow::Result<PgPool> {
    let db_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;
    let max_connections = positive_or(
        env::var("DATABASE_MAX_CONNECTIONS").ok(),
        DatabaseConfig::DEFAULT_MAX_CONNECTIONS as usize,
    );
    let config = DatabaseConfig::new(db_url)
        .with_max_connections(u32::try_from(max_connections).unwrap_or(u32::MAX));

    let pool = create_postgres_pool(&config).await?;

    let migrations_path =
        env::var("MIGRATIONS_PATH").unwrap_or_else(|_| "./migrations".to_string());
    run_migrations(&pool, &migrations_path).await?;
    tracing::info!("Database ready, migrations applied from {migrations_path}");

    Ok(pool)
}
