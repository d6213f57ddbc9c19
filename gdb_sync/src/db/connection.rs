//! Database connection handling
//!
//! This module provides functionality to establish and manage the single
//! connection a synchronization run works through.

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// Handle to the PostgreSQL database
///
/// Backed by a pool capped at one connection, so statements are serialized
/// and a dropped connection is re-established on next use.
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Create a new database connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let url = config.resolve_url().ok_or_else(|| {
            Error::ConfigError("no connection string configured and DATABASE_URI is not set".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.timeout_seconds))
            .connect(&url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close the underlying connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Connects on first use and hands out the cached handle afterwards
pub struct ConnectionManager {
    config: DatabaseConfig,
    connection: Option<DatabaseConnection>,
}

impl ConnectionManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// The live connection, or `None` if it cannot be established.
    /// Failures are logged, never returned.
    pub async fn connection(&mut self) -> Option<&DatabaseConnection> {
        if self.connection.is_none() {
            match DatabaseConnection::connect(&self.config).await {
                Ok(connection) => {
                    tracing::debug!("Database connection established");
                    self.connection = Some(connection);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database");
                    return None;
                }
            }
        }

        self.connection.as_ref()
    }

    /// Close the cached connection, if any
    pub async fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
            tracing::debug!("Database connection closed");
        }
    }
}
