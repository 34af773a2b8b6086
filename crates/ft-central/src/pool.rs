//! Central database connection pool management
//!
//! PostgreSQL connection pooling using SQLx. Reachability is checked once
//! per engine operation; a failure here aborts before any write.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use ft_core::{CentralConfig, EngineError, FtResult};

/// Central database connection pool
#[derive(Clone)]
pub struct CentralDatabase {
    pool: PgPool,
}

impl CentralDatabase {
    /// Create a new connection pool against the central store
    pub async fn connect(config: &CentralConfig) -> FtResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| EngineError::connectivity(e.to_string()))?;

        tracing::info!(
            max_connections = config.max_connections,
            "central store pool created"
        );

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check that the central store is reachable
    pub async fn ping(&self) -> FtResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| EngineError::connectivity(e.to_string()))?;
        Ok(())
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("central store pool closed");
    }
}
