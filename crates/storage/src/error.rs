//! Storage error types.

use rest_client::RestError;
use thiserror::Error;

/// Errors raised by a record store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// REST client error from the storage API.
    #[error("REST client error: {0}")]
    Rest(#[from] RestError),
}
