use thiserror::Error;

/// Top-level error type for the `topomap-api` crate.
///
/// Covers every failure mode of a remote inventory query: transport,
/// HTTP status, error envelopes returned by the inventory holder, and
/// undecodable bodies. `topomap-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Inventory service ───────────────────────────────────────────
    /// Non-success HTTP status from the inventory service.
    #[error("Inventory service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The inventory holder answered with an explicit error envelope.
    #[error("Inventory query failed: {message}")]
    Remote { message: String },

    /// The inventory holder answered with an empty (`null`) body.
    #[error("Inventory service returned an empty response")]
    EmptyResponse,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }
}
