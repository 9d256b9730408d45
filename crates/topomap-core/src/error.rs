// ── Core error types ──
//
// Errors surfaced by the topology store, the discovery pipeline, and the
// geo lookup. Transport-level failures from `topomap-api` never leak out
// raw: the `From<topomap_api::Error>` impl folds them into
// `RemoteQueryFailed` or `Timeout`.

use thiserror::Error;

use crate::model::Action;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store errors ─────────────────────────────────────────────────
    /// The batch dispatcher has no handling for this action/kind pair.
    #[error("Unsupported action {action} for {kind}")]
    UnsupportedAction { action: Action, kind: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// Stored data broke a model guarantee (e.g. a node without a location).
    #[error("Invariant violated: {message}")]
    InvariantViolation { message: String },

    // ── Discovery errors ─────────────────────────────────────────────
    #[error("Inventory query to {service} failed: {reason}")]
    RemoteQueryFailed { service: String, reason: String },

    #[error("Inventory query timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A response did not have the shape the adapter expects.
    #[error("Malformed inventory batch: {message}")]
    MalformedBatchShape { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Cannot load city dataset {path}: {message}")]
    CityDataset { path: String, message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_owned(),
        }
    }

    /// Whether this error ends a discovery cycle without touching the store.
    pub fn is_discovery_failure(&self) -> bool {
        matches!(
            self,
            Self::RemoteQueryFailed { .. } | Self::Timeout { .. } | Self::MalformedBatchShape { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<topomap_api::Error> for CoreError {
    fn from(err: topomap_api::Error) -> Self {
        match err {
            topomap_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            topomap_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid inventory URL: {e}"),
            },
            topomap_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::Timeout { timeout_secs: 0 }
            }
            other => CoreError::RemoteQueryFailed {
                service: "inventory".into(),
                reason: other.to_string(),
            },
        }
    }
}
