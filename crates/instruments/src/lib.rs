//! Instrument directory built from the broker's published catalogs.
//!
//! Upstox publishes per-exchange instrument catalogs as gzipped JSON
//! (`NSE.json.gz`, `BSE.json.gz`, `MCX.json.gz`). This crate downloads
//! them, keeps an in-memory directory for resolving TradingView symbols
//! to broker instrument keys, serves a ranked search over it, and falls
//! back to an on-disk cache when a download fails.

mod catalog;
mod directory;
mod error;

pub use catalog::{parse_catalog, parse_gzipped_catalog, CatalogEntry};
pub use directory::{
    create_instrument_directory, strip_exchange_prefix, Instrument, InstrumentDirectory,
    SharedInstrumentDirectory, SyncReport, DEFAULT_SEGMENTS,
};
pub use error::DirectoryError;
