//! Broker token lifecycle.
//!
//! Holds the single authoritative token pair, answers staleness
//! queries and performs the one refresh attempt allowed per stale
//! encounter. The pair is persisted through the record store so a
//! restart resumes where the last login left off.

use auth::TokenPair;
use chrono::Utc;
use parking_lot::RwLock;
use storage::{SharedRecordStore, TokenRecord};
use tracing::{info, warn};

use crate::broker::SharedBroker;

/// Manages the broker token pair across its lifecycle.
pub struct TokenManager {
    broker: SharedBroker,
    store: SharedRecordStore,
    pair: RwLock<Option<TokenPair>>,
    // Serializes refresh attempts so two stale callers cannot race
    // two exchanges
    refresh_guard: tokio::sync::Mutex<()>,
}

impl TokenManager {
    pub fn new(broker: SharedBroker, store: SharedRecordStore) -> Self {
        Self {
            broker,
            store,
            pair: RwLock::new(None),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Load a persisted pair if the store holds one.
    ///
    /// The store does not record expiry; it is re-derived from the
    /// stored `updated_at`, so a pair persisted before the daily
    /// cutoff counts as stale on the first check.
    pub async fn load_from_store(&self) -> bool {
        match self.store.load_token_pair().await {
            Ok(Some(record)) => {
                let pair = TokenPair::new(
                    record.access_token,
                    record.refresh_token,
                    record.updated_at,
                );
                info!(expires_at = %pair.expires_at(), "Token pair loaded from store");
                self.install(pair);
                true
            }
            Ok(None) => {
                info!("No token pair in store; login required");
                false
            }
            Err(err) => {
                warn!(error = %err, "Failed to load token pair from store");
                false
            }
        }
    }

    /// Install a freshly exchanged pair and persist it.
    ///
    /// Store failures are logged and swallowed; the in-memory pair is
    /// authoritative either way.
    pub async fn adopt(&self, access_token: String, refresh_token: String) {
        let now = Utc::now();
        let record = TokenRecord {
            access_token: access_token.clone(),
            refresh_token: refresh_token.clone(),
            updated_at: now,
        };

        if let Err(err) = self.store.save_token_pair(&record).await {
            warn!(error = %err, "Failed to persist token pair");
        }

        let pair = TokenPair::new(access_token, refresh_token, now);
        info!(expires_at = %pair.expires_at(), "Token pair adopted");
        self.install(pair);
    }

    /// Current access token, stale or not.
    pub fn access_token(&self) -> Option<String> {
        self.pair
            .read()
            .as_ref()
            .map(|pair| pair.expose_access_token().to_string())
    }

    /// Whether a pair is held at all.
    pub fn has_pair(&self) -> bool {
        self.pair.read().is_some()
    }

    /// Ensure a usable access token, refreshing once if stale.
    ///
    /// Returns false when no pair is held or the refresh attempt
    /// failed; callers treat both as "no valid token".
    pub async fn ensure_valid(&self) -> bool {
        match self.pair.read().as_ref() {
            None => return false,
            Some(pair) if !pair.is_stale(Utc::now()) => return true,
            Some(_) => {}
        }

        // One refresh in flight at a time; later arrivals re-check
        // after the winner has swapped the new pair in
        let _guard = self.refresh_guard.lock().await;

        let refresh_token = {
            let pair = self.pair.read();
            match pair.as_ref() {
                None => return false,
                Some(pair) if !pair.is_stale(Utc::now()) => return true,
                Some(pair) => pair.expose_refresh_token().to_string(),
            }
        };

        match self.broker.refresh_token(&refresh_token).await {
            Ok(response) => {
                // Brokers that do not rotate refresh tokens omit the
                // field; keep using the current one
                let next_refresh = response.refresh_token.unwrap_or(refresh_token);
                self.adopt(response.access_token, next_refresh).await;
                true
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed; login required");
                false
            }
        }
    }

    fn install(&self, pair: TokenPair) {
        *self.pair.write() = Some(pair);
    }
}
