//! crates/study_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! The core never talks to a database or object store directly; it goes through
//! the `BlobStore` port so adapters can be swapped (PostgreSQL, in-memory, ...).

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and core operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Stored record could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Whole-object key/value storage. Writes replace the previous body entirely.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches the body stored under `key`, or `PortError::NotFound`.
    async fn get(&self, key: &str) -> PortResult<Vec<u8>>;

    /// Stores `body` under `key`, overwriting anything already there.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> PortResult<()>;
}
