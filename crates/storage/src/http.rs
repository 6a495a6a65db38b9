//! PostgREST-backed record store.
//!
//! Targets the REST surface of a hosted Postgres (Supabase and
//! friends): table endpoints under `/rest/v1/`, filters in the query
//! string, the service key in both the `apikey` and `Authorization`
//! headers.

use crate::{RecordStore, StorageError, TokenRecord};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use model::OrderLogEntry;
use rest_client::RestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout for storage calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed row id for the singleton tables (token pair, PIN digest).
const SINGLETON_ID: i64 = 1;

const TOKENS_TABLE: &str = "/rest/v1/broker_tokens";
const ORDER_LOGS_TABLE: &str = "/rest/v1/order_logs";
const PIN_TABLE: &str = "/rest/v1/dashboard_pin";

/// Record store speaking the PostgREST wire protocol.
pub struct HttpRecordStore {
    client: RestClient,
    api_key: String,
    bearer: String,
}

#[derive(Serialize)]
struct TokenRow<'a> {
    id: i64,
    access_token: &'a str,
    refresh_token: &'a str,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct StoredTokenRow {
    access_token: String,
    refresh_token: String,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct PinRow<'a> {
    id: i64,
    digest: &'a str,
}

#[derive(Deserialize)]
struct StoredPinRow {
    digest: String,
}

impl HttpRecordStore {
    /// Create a store against the given storage base URL and service key.
    pub fn new(base_url: &str, api_key: String) -> Result<Self, StorageError> {
        let client = RestClient::new(base_url, REQUEST_TIMEOUT)?;
        let bearer = format!("Bearer {}", api_key);

        Ok(Self {
            client,
            api_key,
            bearer,
        })
    }

    /// Headers common to every storage call.
    ///
    /// `Prefer: return=minimal` keeps mutation responses empty.
    fn headers(&self) -> [(&str, &str); 3] {
        [
            ("apikey", self.api_key.as_str()),
            ("Authorization", self.bearer.as_str()),
            ("Prefer", "return=minimal"),
        ]
    }

    /// Filter selecting order log rows older than the cutoff.
    fn prune_query(cutoff: DateTime<Utc>) -> String {
        // RFC 3339 with a Z suffix; a numeric offset would put a '+'
        // in the query string
        format!(
            "created_at=lt.{}",
            cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn save_token_pair(&self, record: &TokenRecord) -> Result<(), StorageError> {
        let headers = self.headers();

        // Delete-then-insert keeps the table at exactly one row
        self.client
            .delete_empty(
                TOKENS_TABLE,
                Some(&format!("id=eq.{}", SINGLETON_ID)),
                Some(&headers),
            )
            .await?;

        let row = TokenRow {
            id: SINGLETON_ID,
            access_token: &record.access_token,
            refresh_token: &record.refresh_token,
            updated_at: record.updated_at,
        };

        self.client
            .post_json_empty(TOKENS_TABLE, &[row], Some(&headers))
            .await?;

        tracing::debug!("Token pair persisted");
        Ok(())
    }

    async fn load_token_pair(&self) -> Result<Option<TokenRecord>, StorageError> {
        let headers = self.headers();
        let query = format!(
            "select=access_token,refresh_token,updated_at&id=eq.{}&limit=1",
            SINGLETON_ID
        );

        let rows: Vec<StoredTokenRow> = self
            .client
            .get(TOKENS_TABLE, Some(&query), Some(&headers))
            .await?;

        Ok(rows.into_iter().next().map(|row| TokenRecord {
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            updated_at: row.updated_at,
        }))
    }

    async fn insert_order_log(&self, entry: &OrderLogEntry) -> Result<(), StorageError> {
        let headers = self.headers();

        self.client
            .post_json_empty(ORDER_LOGS_TABLE, &[entry], Some(&headers))
            .await?;

        Ok(())
    }

    async fn prune_order_logs(&self, cutoff: DateTime<Utc>) -> Result<(), StorageError> {
        let headers = self.headers();

        self.client
            .delete_empty(
                ORDER_LOGS_TABLE,
                Some(&Self::prune_query(cutoff)),
                Some(&headers),
            )
            .await?;

        tracing::debug!(cutoff = %cutoff, "Order logs pruned");
        Ok(())
    }

    async fn load_pin_digest(&self) -> Result<Option<String>, StorageError> {
        let headers = self.headers();
        let query = format!("select=digest&id=eq.{}&limit=1", SINGLETON_ID);

        let rows: Vec<StoredPinRow> = self
            .client
            .get(PIN_TABLE, Some(&query), Some(&headers))
            .await?;

        Ok(rows.into_iter().next().map(|row| row.digest))
    }

    async fn save_pin_digest(&self, digest: &str) -> Result<(), StorageError> {
        let headers = self.headers();

        self.client
            .delete_empty(
                PIN_TABLE,
                Some(&format!("id=eq.{}", SINGLETON_ID)),
                Some(&headers),
            )
            .await?;

        let row = PinRow {
            id: SINGLETON_ID,
            digest,
        };

        self.client
            .post_json_empty(PIN_TABLE, &[row], Some(&headers))
            .await?;

        tracing::debug!("PIN digest persisted");
        Ok(())
    }
}
