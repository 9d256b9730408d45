// Inventory query HTTP client
//
// Wraps `reqwest::Client` with service/area URL construction, per-query
// timeouts, and classification of the answer into a single record or a
// batch. The inventory holder itself (and whatever elects it) lives
// behind the base URL.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ErrorEnvelope, InventoryQuery, QueryResponse};
use crate::transport::TransportConfig;

/// Raw HTTP client for the remote inventory service.
///
/// Queries are addressed as `GET {base}/{area}/{service}?q={query}`.
/// A `null` body, an `{"error": ...}` envelope, and any non-success status
/// are all reported as errors; everything else is handed back as a
/// [`QueryResponse`] for the caller to decode.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl InventoryClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The inventory service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build the URL addressing one service in one area.
    pub(crate) fn service_url(&self, service: &str, area: u8) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{area}/{service}"))?)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Issue one query and classify the answer.
    ///
    /// The request is bounded by `query.timeout_secs`; exceeding it yields
    /// [`Error::Timeout`] rather than a transport error.
    pub async fn query(&self, query: &InventoryQuery) -> Result<QueryResponse, Error> {
        let url = self.service_url(&query.service, query.area)?;
        debug!(%url, query = %query.query, "GET inventory");

        let resp = self
            .http
            .get(url)
            .query(&[("q", query.query.as_str())])
            .timeout(Duration::from_secs(query.timeout_secs))
            .send()
            .await
            .map_err(|e| map_transport(e, query.timeout_secs))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| map_transport(e, query.timeout_secs))?;
        parse_body(&body)
    }
}

fn map_transport(err: reqwest::Error, timeout_secs: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout { timeout_secs }
    } else {
        Error::Transport(err)
    }
}

/// Decode a response body into a [`QueryResponse`].
fn parse_body(body: &str) -> Result<QueryResponse, Error> {
    if body.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    // Some inventory holders answer failures with HTTP 200 and `{"error": "..."}`.
    if let Ok(ErrorEnvelope { error: Some(message) }) = serde_json::from_str(body) {
        return Err(Error::Remote { message });
    }

    let value: Value = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })?;

    QueryResponse::from_value(value).ok_or(Error::EmptyResponse)
}
