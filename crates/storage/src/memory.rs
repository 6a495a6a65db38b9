//! In-memory record store.
//!
//! Backs tests and deployments that run without a storage backend.
//! Contents vanish on restart, which for the token pair simply means
//! re-authenticating through the dashboard.

use crate::{RecordStore, StorageError, TokenRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::OrderLogEntry;
use parking_lot::RwLock;

/// Record store holding everything in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    token: RwLock<Option<TokenRecord>>,
    order_logs: RwLock<Vec<OrderLogEntry>>,
    pin_digest: RwLock<Option<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the order log, oldest first.
    pub fn order_logs(&self) -> Vec<OrderLogEntry> {
        self.order_logs.read().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save_token_pair(&self, record: &TokenRecord) -> Result<(), StorageError> {
        *self.token.write() = Some(record.clone());
        Ok(())
    }

    async fn load_token_pair(&self) -> Result<Option<TokenRecord>, StorageError> {
        Ok(self.token.read().clone())
    }

    async fn insert_order_log(&self, entry: &OrderLogEntry) -> Result<(), StorageError> {
        self.order_logs.write().push(entry.clone());
        Ok(())
    }

    async fn prune_order_logs(&self, cutoff: DateTime<Utc>) -> Result<(), StorageError> {
        self.order_logs.write().retain(|entry| entry.created_at >= cutoff);
        Ok(())
    }

    async fn load_pin_digest(&self) -> Result<Option<String>, StorageError> {
        Ok(self.pin_digest.read().clone())
    }

    async fn save_pin_digest(&self, digest: &str) -> Result<(), StorageError> {
        *self.pin_digest.write() = Some(digest.to_string());
        Ok(())
    }
}
