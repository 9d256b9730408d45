// ── Topology service ──
//
// Lifecycle for one topology: activation schedules a one-shot discovery
// after the settle delay, deactivation cancels it if it has not started.
// Discovery fetches inventory records, converts them through the adapter,
// matches sub-elements into links and persists everything into the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use topomap_api::InventoryQuery;

use crate::catalog::TopologyCatalog;
use crate::config::TopologyConfig;
use crate::discovery::{DiscoveryAdapter, InventorySource, decode_records};
use crate::error::CoreError;
use crate::matcher::{aggregate_links, match_links};
use crate::model::{Element, Topology, TopologyLocation, TopologyMetadata, TopologyQuery};
use crate::store::TopologyStore;

// ── ServiceState ─────────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ServiceState {
    Inactive,
    Activating,
    Active,
}

/// Outcome of one successful discovery cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub nodes: usize,
    pub locations: usize,
    pub links: usize,
    pub finished_at: DateTime<Utc>,
}

// ── TopologyService ──────────────────────────────────────────────────

/// Discovery-backed topology.
///
/// Cheaply cloneable; clones share the store and lifecycle. Creating a
/// service does nothing remote: call [`activate`](Self::activate) to
/// schedule discovery or [`discover_now`](Self::discover_now) to run it
/// inline.
pub struct TopologyService<A, S> {
    inner: Arc<ServiceInner<A, S>>,
}

impl<A, S> Clone for TopologyService<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ServiceInner<A, S> {
    config: TopologyConfig,
    adapter: A,
    source: S,
    store: Arc<TopologyStore>,
    state: watch::Sender<ServiceState>,
    last_discovery: watch::Sender<Option<DiscoveryReport>>,
    catalog: Option<Arc<TopologyCatalog>>,
    cancel: CancellationToken,
    /// Child token for the current activation; replaced on deactivate.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<A, S> TopologyService<A, S>
where
    A: DiscoveryAdapter,
    S: InventorySource,
{
    pub fn new(config: TopologyConfig, adapter: A, source: S) -> Self {
        let store = Arc::new(TopologyStore::new(adapter.topology_name()));
        let (state, _) = watch::channel(ServiceState::Inactive);
        let (last_discovery, _) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ServiceInner {
                config,
                adapter,
                source,
                store,
                state,
                last_discovery,
                catalog: None,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register in `catalog` while active.
    ///
    /// Must be called before the service is cloned.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<TopologyCatalog>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.catalog = Some(catalog);
        } else {
            warn!("service already shared, catalog not attached");
        }
        self
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.inner.config
    }

    pub fn adapter(&self) -> &A {
        &self.inner.adapter
    }

    pub fn store(&self) -> &Arc<TopologyStore> {
        &self.inner.store
    }

    pub fn metadata(&self) -> TopologyMetadata {
        TopologyMetadata {
            name: self.inner.adapter.topology_name().to_owned(),
            service_name: self.inner.adapter.service_name().to_owned(),
            service_area: self.inner.adapter.service_area(),
        }
    }

    pub fn state(&self) -> ServiceState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServiceState> {
        self.inner.state.subscribe()
    }

    /// Report of the most recent successful discovery, if any.
    pub fn last_discovery(&self) -> Option<DiscoveryReport> {
        self.inner.last_discovery.borrow().clone()
    }

    pub fn subscribe_discovery(&self) -> watch::Receiver<Option<DiscoveryReport>> {
        self.inner.last_discovery.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Activate the topology.
    ///
    /// Registers it in the catalog and schedules one discovery cycle after
    /// the configured settle delay. Activating an active service is a no-op.
    pub async fn activate(&self) {
        if self.state() != ServiceState::Inactive {
            debug!(topology = %self.inner.store.name(), "already active");
            return;
        }
        self.inner.state.send_replace(ServiceState::Activating);

        if let Some(catalog) = &self.inner.catalog {
            catalog.add(self.metadata());
        }

        let cancel = self.inner.cancel_child.lock().await.clone();
        let handle = tokio::spawn(settle_then_discover(self.clone(), cancel));
        self.inner.task_handles.lock().await.push(handle);

        self.inner.state.send_replace(ServiceState::Active);
        info!(
            topology = %self.inner.store.name(),
            settle_secs = self.inner.config.settle_delay.as_secs(),
            "topology activated"
        );
    }

    /// Deactivate the topology.
    ///
    /// Cancels a discovery that is still waiting out the settle delay and
    /// waits for one already running. Stored data is kept.
    pub async fn deactivate(&self) {
        {
            let mut child = self.inner.cancel_child.lock().await;
            child.cancel();
            *child = self.inner.cancel.child_token();
        }

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        if let Some(catalog) = &self.inner.catalog {
            catalog.remove(
                self.inner.adapter.service_name(),
                self.inner.adapter.service_area(),
            );
        }

        self.inner.state.send_replace(ServiceState::Inactive);
        debug!(topology = %self.inner.store.name(), "topology deactivated");
    }

    // ── Discovery ────────────────────────────────────────────────────

    /// Run one discovery cycle now.
    ///
    /// Nothing is persisted unless the query succeeds and every record
    /// decodes.
    pub async fn discover_now(&self) -> Result<DiscoveryReport, CoreError> {
        let inner = &self.inner;
        let adapter = &inner.adapter;
        let config = &inner.config;

        let query = InventoryQuery::paged(
            adapter.service_name(),
            adapter.service_area(),
            adapter.selector(),
            config.page_limit,
            config.page,
            config.query_timeout_secs,
        );
        debug!(service = %query.service, area = query.area, query = %query.query, "discovery query");

        let response = inner.source.query(&query).await?;
        let records: Vec<A::Record> = decode_records(response)?;

        let mut nodes = Vec::with_capacity(records.len());
        let mut locations: BTreeMap<String, TopologyLocation> = BTreeMap::new();
        let mut elements = BTreeMap::new();
        for record in &records {
            let (node, location) = adapter.convert(record);
            locations.entry(location.location.clone()).or_insert(location);
            nodes.push(node);
            elements.insert(adapter.id_of(record), adapter.elements_of(record));
        }

        let mut links = match_links(&elements, |a, z| adapter.is_connected(a, z));
        if config.aggregate_links {
            links = aggregate_links(&links);
        }

        let report = DiscoveryReport {
            nodes: nodes.len(),
            locations: locations.len(),
            links: links.len(),
            finished_at: Utc::now(),
        };

        let store = &inner.store;
        store
            .post(locations.into_values().map(Element::from).collect())
            .await?;
        store.post(nodes.into_iter().map(Element::from).collect()).await?;
        store.post(links.into_iter().map(Element::from).collect()).await?;

        info!(
            topology = %store.name(),
            records = records.len(),
            nodes = report.nodes,
            locations = report.locations,
            links = report.links,
            "discovery complete"
        );
        inner.last_discovery.send_replace(Some(report.clone()));
        Ok(report)
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Build a view on the configured canvas.
    pub async fn get(&self, query: &TopologyQuery) -> Result<Topology, CoreError> {
        self.inner.store.get(query, self.inner.config.canvas).await
    }
}

async fn settle_then_discover<A, S>(service: TopologyService<A, S>, cancel: CancellationToken)
where
    A: DiscoveryAdapter,
    S: InventorySource,
{
    let delay = service.inner.config.settle_delay;
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!("discovery cancelled before settle delay elapsed");
        }
        () = tokio::time::sleep(delay) => {
            if let Err(e) = service.discover_now().await {
                warn!(error = %e, topology = %service.inner.store.name(), "discovery failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::discovery::{NetworkDeviceAdapter, StaticInventory};
    use crate::geo::CityTable;

    fn adapter() -> NetworkDeviceAdapter {
        NetworkDeviceAdapter::new("inventory", 0, Arc::new(CityTable::default()))
    }

    fn inventory() -> StaticInventory {
        let doc = json!({"list": [
            {
                "id": "R1",
                "equipment_info": {"device_type": "DEVICE_TYPE_ROUTER", "location": "Paris", "latitude": 48.85, "longitude": 2.35},
                "physicals": {"p": {"ports": [{"id": "1"}, {"id": "2"}]}}
            },
            {
                "id": "R2",
                "equipment_info": {"device_type": "DEVICE_TYPE_ROUTER", "location": "Paris", "latitude": 48.85, "longitude": 2.35},
                "physicals": {"p": {"ports": [{"id": "1"}, {"id": "2"}]}}
            }
        ]});
        StaticInventory::from_json(&doc.to_string()).unwrap()
    }

    fn service(
        config: TopologyConfig,
        source: StaticInventory,
    ) -> TopologyService<NetworkDeviceAdapter, StaticInventory> {
        TopologyService::new(config, adapter(), source)
    }

    #[tokio::test]
    async fn discovery_persists_nodes_locations_and_links() {
        let svc = service(TopologyConfig::default(), inventory());
        let report = svc.discover_now().await.unwrap();

        assert_eq!((report.nodes, report.locations, report.links), (2, 1, 2));
        assert_eq!(svc.store().counts(), (2, 2, 1));
        assert!(svc.store().link("networkdevice<R1>.port<1><->networkdevice<R2>.port<1>").is_some());
        assert_eq!(svc.last_discovery(), Some(report));
    }

    #[tokio::test]
    async fn aggregation_rolls_port_links_up_per_device_pair() {
        let config = TopologyConfig {
            aggregate_links: true,
            ..TopologyConfig::default()
        };
        let svc = service(config, inventory());
        svc.discover_now().await.unwrap();

        let link = svc.store().link("R1::R2").unwrap();
        assert_eq!(link.aggregated.len(), 2);
    }

    #[tokio::test]
    async fn failed_query_persists_nothing() {
        let svc = service(TopologyConfig::default(), StaticInventory::empty());
        let err = svc.discover_now().await.unwrap_err();
        assert!(matches!(err, CoreError::RemoteQueryFailed { .. }));
        assert_eq!(svc.store().counts(), (0, 0, 0));
        assert!(svc.last_discovery().is_none());
    }

    #[tokio::test]
    async fn one_bad_record_abandons_the_cycle() {
        let source =
            StaticInventory::from_json(r#"[{"id": "R1"}, {"equipment_info": {}}]"#).unwrap();
        let svc = service(TopologyConfig::default(), source);
        let err = svc.discover_now().await.unwrap_err();
        assert!(matches!(err, CoreError::MalformedBatchShape { .. }));
        assert_eq!(svc.store().counts(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn activation_discovers_after_the_settle_delay() {
        let svc = service(TopologyConfig::default(), inventory());
        let mut reports = svc.subscribe_discovery();

        svc.activate().await;
        assert_eq!(svc.state(), ServiceState::Active);
        assert_eq!(svc.store().counts(), (0, 0, 0));

        reports.changed().await.unwrap();
        assert_eq!(svc.store().counts(), (2, 2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn deactivation_cancels_a_pending_discovery() {
        let svc = service(TopologyConfig::default(), inventory());
        svc.activate().await;
        svc.deactivate().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(svc.state(), ServiceState::Inactive);
        assert_eq!(svc.store().counts(), (0, 0, 0));

        // A fresh activation is not affected by the earlier cancellation.
        svc.activate().await;
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(svc.store().counts(), (2, 2, 1));
    }

    #[tokio::test]
    async fn catalog_tracks_activation() {
        let catalog = Arc::new(TopologyCatalog::new());
        let svc = service(
            TopologyConfig {
                settle_delay: Duration::from_secs(3600),
                ..TopologyConfig::default()
            },
            inventory(),
        )
        .with_catalog(Arc::clone(&catalog));

        svc.activate().await;
        assert_eq!(catalog.get("inventory", 0).unwrap().name, "L1");

        svc.deactivate().await;
        assert!(catalog.is_empty());
    }
}
