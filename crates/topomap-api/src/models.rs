// Wire-level types for the remote inventory query.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Verb carried by a remote query. Discovery only ever reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
}

/// One remote inventory query: who answers it and what is asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub service: String,
    pub area: u8,
    pub verb: Verb,
    /// `"<selector> limit <N> page <P>"`
    pub query: String,
    pub timeout_secs: u64,
}

impl InventoryQuery {
    /// Build a paged GET query.
    pub fn paged(
        service: impl Into<String>,
        area: u8,
        selector: &str,
        limit: u32,
        page: u32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            service: service.into(),
            area,
            verb: Verb::Get,
            query: format!("{selector} limit {limit} page {page}"),
            timeout_secs,
        }
    }
}

/// Shape of a successful inventory answer.
///
/// The inventory holder answers with either one record or a batch of
/// records. Batches arrive as a bare JSON array or wrapped in an object
/// carrying a `list` (or `List`) array.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    Single(Value),
    Batch(Vec<Value>),
}

impl QueryResponse {
    /// Classify a decoded body. `None` means the body was `null`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::Batch(items)),
            Value::Object(mut map) => {
                let key = ["list", "List"]
                    .into_iter()
                    .find(|k| map.get(*k).is_some_and(Value::is_array));
                match key.and_then(|k| map.remove(k)) {
                    Some(Value::Array(items)) => Some(Self::Batch(items)),
                    _ => Some(Self::Single(Value::Object(map))),
                }
            }
            other => Some(Self::Single(other)),
        }
    }

    /// Number of records carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Error envelope some inventory holders answer with (HTTP 200).
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<String>,
}
