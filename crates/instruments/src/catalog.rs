//! Published catalog download format.

use crate::error::DirectoryError;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One row of a published instrument catalog.
///
/// The catalogs carry many more fields (ISIN, lot size, tick size);
/// only the ones the relay needs are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub instrument_key: String,
    #[serde(alias = "tradingsymbol")]
    pub trading_symbol: String,
    pub exchange: String,
    pub instrument_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Decompress and parse a gzipped catalog body.
pub fn parse_gzipped_catalog(bytes: &[u8]) -> Result<Vec<CatalogEntry>, DirectoryError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut json = Vec::new();
    decoder
        .read_to_end(&mut json)
        .map_err(|e| DirectoryError::Decompress(e.to_string()))?;

    parse_catalog(&json)
}

/// Parse an uncompressed catalog body.
pub fn parse_catalog(json: &[u8]) -> Result<Vec<CatalogEntry>, DirectoryError> {
    serde_json::from_slice(json).map_err(|e| DirectoryError::Parse(e.to_string()))
}
