//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `BlobStore` port from the `core` crate. Every record is a row in the
//! `blobs` table holding the serialized document under its key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use study_core::ports::{BlobStore, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `BlobStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BlobRecord {
    body: Vec<u8>,
    content_type: String,
    updated_at: DateTime<Utc>,
}

//=========================================================================================
// `BlobStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl BlobStore for DbAdapter {
    async fn get(&self, key: &str) -> PortResult<Vec<u8>> {
        let record = sqlx::query_as::<_, BlobRecord>(
            "SELECT body, content_type, updated_at FROM blobs WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("Blob {} not found", key)))?;

        debug!(
            key,
            content_type = %record.content_type,
            updated_at = %record.updated_at,
            "Loaded blob"
        );
        Ok(record.body)
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO blobs (key, body, content_type, updated_at) VALUES ($1, $2, $3, now()) \
             ON CONFLICT (key) DO UPDATE \
             SET body = EXCLUDED.body, content_type = EXCLUDED.content_type, updated_at = now()",
        )
        .bind(key)
        .bind(body)
        .bind(content_type)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
