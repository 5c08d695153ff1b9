// Async HTTP client for the ParkPro transaction store.
//
// Base path: configurable, e.g. http://127.0.0.1:5000/api/
// Auth: none

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{NewSessionRecord, RecordId, SessionRecord};

/// Default store location used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

// ── Error response shape ────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the transaction store.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
/// Requests are never retried.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StoreClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and force a trailing slash so relative joins
    /// append rather than replace the last path segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized base URL (always ends in `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// `transactions/{id}` with the id percent-encoded as one segment.
    fn transaction_url(&self, id: &RecordId) -> Result<Url, Error> {
        let mut url = self.url("transactions")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(&id.to_string());
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");
        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");
        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    /// Success check only; the acknowledgement body is ignored.
    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    #[allow(clippy::unused_self)]
    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.error.or(err.message))
            .unwrap_or_else(|| {
                if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Decode a listing body element by element.
    ///
    /// A body that isn't an array yields an empty list; rows that aren't
    /// objects are dropped.
    fn decode_records(body: Value, endpoint: &str) -> Vec<SessionRecord> {
        let Value::Array(rows) = body else {
            warn!(endpoint, "expected a JSON array, treating as empty");
            return Vec::new();
        };
        let total = rows.len();
        let records: Vec<SessionRecord> =
            rows.into_iter().filter_map(SessionRecord::from_value).collect();
        if records.len() < total {
            warn!(
                endpoint,
                dropped = total - records.len(),
                "skipped malformed rows"
            );
        }
        records
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Transactions ─────────────────────────────────────────────────

    /// `GET /transactions`: every session, open or closed.
    pub async fn list_transactions(&self) -> Result<Vec<SessionRecord>, Error> {
        let body: Value = self.get(self.url("transactions")?).await?;
        Ok(Self::decode_records(body, "transactions"))
    }

    /// `POST /transactions`: create an open session.
    pub async fn create_transaction(
        &self,
        record: &NewSessionRecord,
    ) -> Result<SessionRecord, Error> {
        let body: Value = self.post(self.url("transactions")?, record).await?;
        Ok(SessionRecord::from_value(body).unwrap_or_default())
    }

    /// `PUT /transactions/{id}`: replace a session with `record`.
    pub async fn update_transaction(
        &self,
        id: &RecordId,
        record: &SessionRecord,
    ) -> Result<SessionRecord, Error> {
        let body: Value = self.put(self.transaction_url(id)?, record).await?;
        Ok(SessionRecord::from_value(body).unwrap_or_default())
    }

    /// `DELETE /transactions/{id}`.
    pub async fn delete_transaction(&self, id: &RecordId) -> Result<(), Error> {
        self.delete(self.transaction_url(id)?).await
    }

    // ── History ──────────────────────────────────────────────────────

    /// `GET /history`: the ledger view of past sessions.
    pub async fn list_history(&self) -> Result<Vec<SessionRecord>, Error> {
        let body: Value = self.get(self.url("history")?).await?;
        Ok(Self::decode_records(body, "history"))
    }

    // ── Parking slots ────────────────────────────────────────────────

    /// `GET /parking/occupied`: slot codes held by open sessions.
    ///
    /// Non-string entries are skipped.
    pub async fn occupied_slots(&self) -> Result<Vec<String>, Error> {
        let body: Value = self.get(self.url("parking/occupied")?).await?;
        let Value::Array(items) = body else {
            warn!("occupied slots response was not an array, treating as empty");
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            StoreClient::from_reqwest("http://127.0.0.1:5000/api", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:5000/api/");
        assert_eq!(
            client.url("transactions").unwrap().as_str(),
            "http://127.0.0.1:5000/api/transactions"
        );
    }

    #[test]
    fn transaction_url_encodes_id() {
        let client =
            StoreClient::from_reqwest("http://localhost:5000/api/", reqwest::Client::new())
                .unwrap();
        let url = client.transaction_url(&RecordId::from("a b/c")).unwrap();
        assert_eq!(url.path(), "/api/transactions/a%20b%2Fc");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = StoreClient::from_reqwest("not a url", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
