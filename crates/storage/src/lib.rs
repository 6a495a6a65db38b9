//! Durable relay state behind a pluggable store.
//!
//! The relay persists three things: the current broker token pair, an
//! append-only order log, and the dashboard PIN digest. [`RecordStore`]
//! abstracts over where they live. [`HttpRecordStore`] speaks the
//! PostgREST wire protocol of a hosted Postgres; [`MemoryRecordStore`]
//! backs tests and storage-less deployments.
//!
//! # Example
//!
//! ```no_run
//! use storage::{MemoryRecordStore, RecordStore, SharedRecordStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), storage::StorageError> {
//! let store: SharedRecordStore = Arc::new(MemoryRecordStore::new());
//! let pair = store.load_token_pair().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::OrderLogEntry;
use std::fmt;
use std::sync::Arc;

pub use error::StorageError;
pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

/// Persisted broker token pair.
///
/// Tokens are stored in clear in the backing table; the table must
/// only be reachable with the service API key.
#[derive(Clone)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Persistence operations the relay needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Replace the stored token pair.
    async fn save_token_pair(&self, record: &TokenRecord) -> Result<(), StorageError>;

    /// Load the stored token pair, if any.
    async fn load_token_pair(&self) -> Result<Option<TokenRecord>, StorageError>;

    /// Append one order log entry.
    async fn insert_order_log(&self, entry: &OrderLogEntry) -> Result<(), StorageError>;

    /// Delete order log entries created before the cutoff.
    async fn prune_order_logs(&self, cutoff: DateTime<Utc>) -> Result<(), StorageError>;

    /// Load the stored PIN digest, if any.
    async fn load_pin_digest(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored PIN digest.
    async fn save_pin_digest(&self, digest: &str) -> Result<(), StorageError>;
}

/// Shared handle to a record store.
pub type SharedRecordStore = Arc<dyn RecordStore>;
