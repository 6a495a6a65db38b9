//! Instrument directory error types.

use rest_client::RestError;
use thiserror::Error;

/// Errors raised while syncing or reading the instrument directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// REST client error while downloading a catalog.
    #[error("REST client error: {0}")]
    Rest(#[from] RestError),

    /// Catalog body could not be gunzipped.
    #[error("Decompression error: {0}")]
    Decompress(String),

    /// Catalog JSON could not be parsed.
    #[error("Catalog parse error: {0}")]
    Parse(String),

    /// Cache file could not be read or written.
    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),
}
