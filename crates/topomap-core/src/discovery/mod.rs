// ── Discovery boundary ──
//
// What the store needs from an inventory domain (`DiscoveryAdapter`) and
// from the remote inventory service (`InventorySource`). The pipeline that
// drives both lives in `crate::service`.

pub mod network_device;

use std::collections::BTreeMap;
use std::future::Future;

use serde::de::DeserializeOwned;
use topomap_api::{InventoryClient, InventoryQuery, QueryResponse};

use crate::error::CoreError;
use crate::model::{LinkDirection, TopologyLocation, TopologyNode};

pub use network_device::NetworkDeviceAdapter;

// ── DiscoveryAdapter ─────────────────────────────────────────────────

/// Per-domain conversion logic injected into a topology service.
///
/// An adapter names the inventory service it reads from, turns each raw
/// record into a node and its location, and exposes the sub-elements the
/// link matcher pairs up along with the predicate that decides whether two
/// of them are connected.
pub trait DiscoveryAdapter: Send + Sync + 'static {
    /// Raw inventory record, decoded from the query response.
    type Record: DeserializeOwned + Send + Sync;
    /// Sub-element the link matcher works on (a port, an interface, ...).
    type Element: Send + Sync;

    /// Topology name this adapter produces (e.g. `"L1"`).
    fn topology_name(&self) -> &str;

    fn service_name(&self) -> &str;

    fn service_area(&self) -> u8;

    /// Query selector, without paging (`"select * from NetworkDevice"`).
    fn selector(&self) -> &str;

    /// Key of the sub-element collection inside a record (`"port"`).
    fn element_collection(&self) -> &str;

    fn id_of(&self, record: &Self::Record) -> String;

    fn location_of(&self, record: &Self::Record) -> String;

    fn convert(&self, record: &Self::Record) -> (TopologyNode, TopologyLocation);

    /// Sub-elements of one record, keyed by their property id.
    fn elements_of(&self, record: &Self::Record) -> BTreeMap<String, Self::Element>;

    fn is_connected(&self, aside: &Self::Element, zside: &Self::Element) -> (bool, LinkDirection);
}

/// Decode every record of a response.
///
/// A single record is treated as a batch of one. Any record that does not
/// decode fails the whole batch.
pub(crate) fn decode_records<R: DeserializeOwned>(
    response: QueryResponse,
) -> Result<Vec<R>, CoreError> {
    let items = match response {
        QueryResponse::Single(item) => vec![item],
        QueryResponse::Batch(items) => items,
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| CoreError::MalformedBatchShape {
                message: format!("record {i}: {e}"),
            })
        })
        .collect()
}

// ── InventorySource ──────────────────────────────────────────────────

/// Something that answers inventory queries.
pub trait InventorySource: Send + Sync + 'static {
    fn query(
        &self,
        query: &InventoryQuery,
    ) -> impl Future<Output = Result<QueryResponse, CoreError>> + Send;
}

impl InventorySource for InventoryClient {
    async fn query(&self, query: &InventoryQuery) -> Result<QueryResponse, CoreError> {
        InventoryClient::query(self, query)
            .await
            .map_err(|e| match CoreError::from(e) {
                CoreError::RemoteQueryFailed { reason, .. } => CoreError::RemoteQueryFailed {
                    service: query.service.clone(),
                    reason,
                },
                other => other,
            })
    }
}

/// A source that always answers with the same response.
///
/// Backs file-based discovery and tests.
#[derive(Debug, Clone)]
pub struct StaticInventory {
    response: Option<QueryResponse>,
}

impl StaticInventory {
    pub fn new(response: QueryResponse) -> Self {
        Self {
            response: Some(response),
        }
    }

    /// A source whose every query fails as if the inventory answered `null`.
    pub fn empty() -> Self {
        Self { response: None }
    }

    /// Parse a JSON document (a record, an array of records, or a
    /// `{"list": [...]}` wrapper).
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| CoreError::MalformedBatchShape {
                message: e.to_string(),
            })?;
        Ok(QueryResponse::from_value(value).map_or_else(Self::empty, Self::new))
    }
}

impl InventorySource for StaticInventory {
    async fn query(&self, query: &InventoryQuery) -> Result<QueryResponse, CoreError> {
        self.response
            .clone()
            .ok_or_else(|| CoreError::RemoteQueryFailed {
                service: query.service.clone(),
                reason: "inventory returned an empty response".into(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Rec {
        id: String,
    }

    #[test]
    fn single_record_is_a_batch_of_one() {
        let records: Vec<Rec> =
            decode_records(QueryResponse::Single(json!({"id": "R1"}))).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "R1");
    }

    #[test]
    fn undecodable_record_fails_the_batch() {
        let err = decode_records::<Rec>(QueryResponse::Batch(vec![
            json!({"id": "R1"}),
            json!({"name": "no id"}),
        ]))
        .unwrap_err();
        assert!(matches!(err, CoreError::MalformedBatchShape { message } if message.starts_with("record 1")));
    }

    #[tokio::test]
    async fn static_inventory_answers_every_query() {
        let source = StaticInventory::from_json(r#"{"list":[{"id":"R1"},{"id":"R2"}]}"#).unwrap();
        let q = InventoryQuery::paged("inventory", 0, "select *", 500, 0, 30);
        assert_eq!(source.query(&q).await.unwrap().len(), 2);
        assert_eq!(source.query(&q).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn null_document_is_a_remote_failure() {
        let source = StaticInventory::from_json("null").unwrap();
        let q = InventoryQuery::paged("inventory", 0, "select *", 500, 0, 30);
        assert!(matches!(
            source.query(&q).await,
            Err(CoreError::RemoteQueryFailed { .. })
        ));
    }
}
