// ── Runtime topology configuration ──
//
// Describes which inventory a topology is discovered from and how views
// are drawn. Core never reads config files: the CLI builds a
// `TopologyConfig` and hands it in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::discovery::NetworkDeviceAdapter;
use crate::geo::{CityLookup, CityTable, ProcessCities};
use crate::layout::Canvas;

/// Configuration for one topology service.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyConfig {
    /// Inventory service answering discovery queries.
    pub service_name: String,
    /// Area the inventory service lives in.
    pub service_area: u8,
    pub canvas: Canvas,
    /// Pause between activation and the first discovery cycle.
    pub settle_delay: Duration,
    /// Records requested per discovery query.
    pub page_limit: u32,
    pub page: u32,
    pub query_timeout_secs: u64,
    /// Roll port-level links up into one link per device pair.
    pub aggregate_links: bool,
    /// City dataset for records without coordinates. `None` disables the
    /// fallback.
    pub city_dataset: Option<PathBuf>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            service_name: "inventory".into(),
            service_area: 0,
            canvas: Canvas::default(),
            settle_delay: Duration::from_secs(5),
            page_limit: 500,
            page: 0,
            query_timeout_secs: 30,
            aggregate_links: false,
            city_dataset: None,
        }
    }
}

impl TopologyConfig {
    /// City lookup for this configuration.
    pub fn city_lookup(&self) -> Arc<dyn CityLookup> {
        match &self.city_dataset {
            Some(path) => Arc::new(ProcessCities::new(path.clone())),
            None => Arc::new(CityTable::default()),
        }
    }

    /// Network-device adapter reading from the configured service.
    pub fn network_device_adapter(&self) -> NetworkDeviceAdapter {
        NetworkDeviceAdapter::new(self.service_name.clone(), self.service_area, self.city_lookup())
    }
}
