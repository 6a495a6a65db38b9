//! In-memory instrument directory with catalog sync and cache fallback.

use crate::catalog::{parse_catalog, parse_gzipped_catalog, CatalogEntry};
use crate::error::DirectoryError;
use parking_lot::RwLock;
use rest_client::RestClient;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Catalog segments fetched by default, in fetch order.
pub const DEFAULT_SEGMENTS: &[&str] = &["NSE", "BSE", "MCX"];

/// Result cap for `search`.
const MAX_SEARCH_RESULTS: usize = 50;

/// Download timeout for catalog fetches. The NSE catalog is tens of
/// megabytes compressed, so this is much longer than an API call.
const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// One instrument known to the directory.
#[derive(Debug, Clone, Serialize)]
pub struct Instrument {
    pub instrument_key: String,
    pub trading_symbol: String,
    pub exchange: String,
    pub instrument_type: String,
    pub name: Option<String>,
}

/// Report of one sync pass over the catalog segments.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Segments loaded from a fresh download.
    pub fetched: Vec<String>,
    /// Segments served from the on-disk cache after a failed download.
    pub cached: Vec<String>,
    /// Segments that could not be loaded at all, with the download error.
    pub failed: Vec<(String, String)>,
    /// Instruments known after the pass.
    pub total_instruments: usize,
}

impl SyncReport {
    /// At least one segment ended up loaded, fresh or cached.
    pub fn any_loaded(&self) -> bool {
        !self.fetched.is_empty() || !self.cached.is_empty()
    }
}

struct DirectoryInner {
    by_key: HashMap<String, Instrument>,
    by_symbol: HashMap<String, Instrument>,
}

/// Thread-safe instrument directory.
///
/// Holds two maps refreshed by `sync`: instrument-key lookups and plain
/// trading-symbol lookups. When the same symbol trades on several
/// exchanges, the NSE listing wins the symbol map.
pub struct InstrumentDirectory {
    client: RestClient,
    segments: Vec<String>,
    cache_dir: PathBuf,
    inner: RwLock<DirectoryInner>,
}

impl InstrumentDirectory {
    /// Create a directory over the default segments.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        assets_base_url: &str,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self, DirectoryError> {
        Self::with_segments(assets_base_url, cache_dir, DEFAULT_SEGMENTS)
    }

    /// Create a directory over an explicit segment list.
    pub fn with_segments(
        assets_base_url: &str,
        cache_dir: impl Into<PathBuf>,
        segments: &[&str],
    ) -> Result<Self, DirectoryError> {
        let client = RestClient::new(assets_base_url, FETCH_TIMEOUT)?;

        Ok(Self {
            client,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            cache_dir: cache_dir.into(),
            inner: RwLock::new(DirectoryInner {
                by_key: HashMap::new(),
                by_symbol: HashMap::new(),
            }),
        })
    }

    /// Refresh the directory from the published catalogs.
    ///
    /// Each segment is handled independently: a failed download falls
    /// back to the on-disk cache, and a segment with neither leaves any
    /// previously merged entries untouched. Sync never fails as a whole.
    pub async fn sync(&self) -> SyncReport {
        let mut report = SyncReport::default();

        for segment in &self.segments {
            match self.fetch_segment(segment).await {
                Ok(entries) => {
                    self.write_cache(segment, &entries);
                    let merged = self.merge(&entries);
                    info!(segment = %segment, instruments = merged, "Catalog segment fetched");
                    report.fetched.push(segment.clone());
                }
                Err(fetch_err) => {
                    warn!(
                        segment = %segment,
                        error = %fetch_err,
                        "Catalog fetch failed, trying cache"
                    );

                    match self.load_cache(segment) {
                        Ok(entries) => {
                            let merged = self.merge(&entries);
                            info!(
                                segment = %segment,
                                instruments = merged,
                                "Catalog segment loaded from cache"
                            );
                            report.cached.push(segment.clone());
                        }
                        Err(cache_err) => {
                            warn!(
                                segment = %segment,
                                error = %cache_err,
                                "Catalog cache unavailable"
                            );
                            report.failed.push((segment.clone(), fetch_err.to_string()));
                        }
                    }
                }
            }
        }

        report.total_instruments = self.len();
        report
    }

    /// Resolve a TradingView-style symbol to an instrument key.
    ///
    /// Strips one optional exchange qualifier ("NSE:SBIN" and "SBIN"
    /// resolve identically) and matches case-insensitively.
    pub fn lookup(&self, symbol: &str) -> Option<String> {
        let plain = strip_exchange_prefix(symbol);
        self.inner
            .read()
            .by_symbol
            .get(&plain.to_uppercase())
            .map(|inst| inst.instrument_key.clone())
    }

    /// Search instruments by symbol or name fragment.
    ///
    /// Ranking: exact symbol match, then symbol prefix, then substring of
    /// symbol or name. Equity instruments sort ahead of other types at
    /// equal rank. Results are capped at `MAX_SEARCH_RESULTS`.
    pub fn search(&self, query: &str, instrument_type: Option<&str>) -> Vec<Instrument> {
        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let inner = self.inner.read();
        let mut ranked: Vec<(u8, u8, Instrument)> = inner
            .by_symbol
            .values()
            .filter(|inst| match instrument_type {
                Some(t) => inst.instrument_type.eq_ignore_ascii_case(t),
                None => true,
            })
            .filter_map(|inst| {
                let symbol = inst.trading_symbol.to_uppercase();
                let rank = if symbol == needle {
                    0
                } else if symbol.starts_with(&needle) {
                    1
                } else if symbol.contains(&needle)
                    || inst
                        .name
                        .as_deref()
                        .is_some_and(|n| n.to_uppercase().contains(&needle))
                {
                    2
                } else {
                    return None;
                };

                let type_rank = u8::from(!inst.instrument_type.eq_ignore_ascii_case("EQ"));
                Some((rank, type_rank, inst.clone()))
            })
            .collect();

        ranked.sort_by(|a, b| (a.0, a.1, &a.2.trading_symbol).cmp(&(b.0, b.1, &b.2.trading_symbol)));
        ranked.truncate(MAX_SEARCH_RESULTS);
        ranked.into_iter().map(|(_, _, inst)| inst).collect()
    }

    /// Number of distinct instrument keys known.
    pub fn len(&self) -> usize {
        self.inner.read().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_key.is_empty()
    }

    async fn fetch_segment(&self, segment: &str) -> Result<Vec<CatalogEntry>, DirectoryError> {
        let path = format!("/{}.json.gz", segment);
        let bytes = self.client.get_bytes(&path, None, None).await?;
        parse_gzipped_catalog(&bytes)
    }

    /// Best-effort cache write; failures are logged, not propagated.
    fn write_cache(&self, segment: &str, entries: &[CatalogEntry]) {
        if let Err(e) = self.try_write_cache(segment, entries) {
            warn!(segment = %segment, error = %e, "Failed to write catalog cache");
        }
    }

    fn try_write_cache(
        &self,
        segment: &str,
        entries: &[CatalogEntry],
    ) -> Result<(), DirectoryError> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let json = serde_json::to_vec(entries).map_err(|e| DirectoryError::Parse(e.to_string()))?;
        std::fs::write(self.cache_path(segment), json)?;
        Ok(())
    }

    fn load_cache(&self, segment: &str) -> Result<Vec<CatalogEntry>, DirectoryError> {
        let bytes = std::fs::read(self.cache_path(segment))?;
        parse_catalog(&bytes)
    }

    fn cache_path(&self, segment: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", segment))
    }

    /// Merge catalog entries into the maps. Returns the count merged.
    fn merge(&self, entries: &[CatalogEntry]) -> usize {
        let mut inner = self.inner.write();

        for entry in entries {
            let instrument = Instrument {
                instrument_key: entry.instrument_key.clone(),
                trading_symbol: entry.trading_symbol.clone(),
                exchange: entry.exchange.clone(),
                instrument_type: entry.instrument_type.clone(),
                name: entry.name.clone(),
            };

            let symbol_key = instrument.trading_symbol.to_uppercase();
            match inner.by_symbol.get(&symbol_key) {
                // NSE listings win symbol collisions
                Some(existing) if existing.exchange == "NSE" && instrument.exchange != "NSE" => {}
                _ => {
                    inner.by_symbol.insert(symbol_key, instrument.clone());
                }
            }

            inner
                .by_key
                .insert(instrument.instrument_key.clone(), instrument);
        }

        entries.len()
    }
}

/// Strip one optional exchange qualifier from a TradingView symbol.
///
/// "NSE:SBIN" becomes "SBIN"; a bare "SBIN" is returned unchanged.
pub fn strip_exchange_prefix(symbol: &str) -> &str {
    match symbol.split_once(':') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => symbol,
    }
}

/// Shared handle to the instrument directory.
pub type SharedInstrumentDirectory = Arc<InstrumentDirectory>;

/// Create a new shared instrument directory over the default segments.
pub fn create_instrument_directory(
    assets_base_url: &str,
    cache_dir: impl Into<PathBuf>,
) -> Result<SharedInstrumentDirectory, DirectoryError> {
    Ok(Arc::new(InstrumentDirectory::new(
        assets_base_url,
        cache_dir,
    )?))
}
