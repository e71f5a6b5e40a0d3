// libs/infra/db/src/client.rs

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::errors::DbError;
use crate::schema;

/// Thin wrapper over the process-wide connection pool. One `DbClient` is
/// constructed at startup and cloned into every task that needs a
/// database handle; cloning is cheap, `sqlx::PgPool` is an `Arc` internally.
#[derive(Clone)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    /// Connects to `database_url`, applies the schema, and returns a ready
    /// client. `max_connections` bounds the pool shared by every task.
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DbError> {
        if database_url.trim().is_empty() {
            return Err(DbError::ConfigurationError(
                "DATABASE_URL is empty".to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        schema::apply_schema(&pool).await?;
        info!("database pool ready, schema applied");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
