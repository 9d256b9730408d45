// ── Network device adapter ──
//
// Physical-layer topology over network-device inventory: one node per
// device, located by `equipment_info.location`, with its ports as the
// sub-elements the link matcher pairs up.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DiscoveryAdapter;
use crate::geo::{CityLookup, project};
use crate::model::ids::property_id;
use crate::model::{LinkDirection, NodeType, TopologyLocation, TopologyNode};

const KIND: &str = "networkdevice";
const COLLECTION: &str = "port";
const SELECTOR: &str = "select * from NetworkDevice";
const UNKNOWN_LOCATION: &str = "Unknown";

// ── Records ──────────────────────────────────────────────────────────

/// One network device as the inventory reports it. Fields the topology
/// does not use are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDevice {
    pub id: String,
    #[serde(default, alias = "equipmentinfo")]
    pub equipment_info: EquipmentInfo,
    #[serde(default)]
    pub physicals: BTreeMap<String, Physical>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentInfo {
    pub sys_name: String,
    pub vendor: String,
    pub model: String,
    pub ip_address: String,
    /// `"DEVICE_TYPE_ROUTER"`, `"Router"`, `"router"`, ...
    pub device_type: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Physical {
    #[serde(default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
}

// ── Adapter ──────────────────────────────────────────────────────────

/// Layer 1 discovery over `NetworkDevice` records.
///
/// Connectivity is a placeholder: any two ports on different devices are
/// considered connected in both directions, so the matcher pairs ports
/// greedily in id order.
#[derive(Clone)]
pub struct NetworkDeviceAdapter {
    service_name: String,
    service_area: u8,
    cities: Arc<dyn CityLookup>,
}

impl std::fmt::Debug for NetworkDeviceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkDeviceAdapter")
            .field("service_name", &self.service_name)
            .field("service_area", &self.service_area)
            .finish_non_exhaustive()
    }
}

impl NetworkDeviceAdapter {
    pub fn new(service_name: impl Into<String>, service_area: u8, cities: Arc<dyn CityLookup>) -> Self {
        Self {
            service_name: service_name.into(),
            service_area,
            cities,
        }
    }

    /// Coordinates for a record, falling back to the city table when the
    /// record reports exactly (0, 0).
    fn coordinates(&self, info: &EquipmentInfo, location: &str) -> (f64, f64) {
        if info.latitude != 0.0 || info.longitude != 0.0 {
            return (info.latitude, info.longitude);
        }
        self.cities
            .coordinates(location)
            .map_or((0.0, 0.0), |(lon, lat)| (lat, lon))
    }
}

impl DiscoveryAdapter for NetworkDeviceAdapter {
    type Record = NetworkDevice;
    type Element = Port;

    fn topology_name(&self) -> &str {
        "L1"
    }

    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn service_area(&self) -> u8 {
        self.service_area
    }

    fn selector(&self) -> &str {
        SELECTOR
    }

    fn element_collection(&self) -> &str {
        COLLECTION
    }

    fn id_of(&self, record: &NetworkDevice) -> String {
        record.id.clone()
    }

    fn location_of(&self, record: &NetworkDevice) -> String {
        let location = record.equipment_info.location.trim();
        if location.is_empty() {
            UNKNOWN_LOCATION.to_owned()
        } else {
            location.to_owned()
        }
    }

    fn convert(&self, record: &NetworkDevice) -> (TopologyNode, TopologyLocation) {
        let info = &record.equipment_info;
        let location = self.location_of(record);
        let name = if info.sys_name.is_empty() {
            record.id.clone()
        } else {
            info.sys_name.clone()
        };

        let node = TopologyNode::new(
            record.id.clone(),
            name,
            location.clone(),
            node_type_of(&info.device_type),
        );

        let (latitude, longitude) = self.coordinates(info, &location);
        let (svg_x, svg_y) = project(latitude, longitude);
        let location = TopologyLocation {
            location,
            latitude,
            longitude,
            svg_x,
            svg_y,
        };
        (node, location)
    }

    fn elements_of(&self, record: &NetworkDevice) -> BTreeMap<String, Port> {
        let many_physicals = record.physicals.len() > 1;
        record
            .physicals
            .iter()
            .flat_map(|(physical, p)| p.ports.iter().map(move |port| (physical, port)))
            .map(|(physical, port)| {
                let key = if many_physicals {
                    format!("{physical}/{}", port.id)
                } else {
                    port.id.clone()
                };
                (property_id(KIND, &record.id, COLLECTION, &key), port.clone())
            })
            .collect()
    }

    fn is_connected(&self, _aside: &Port, _zside: &Port) -> (bool, LinkDirection) {
        (true, LinkDirection::Bidirectional)
    }
}

/// Map an inventory device type onto a node type. Unknown types are generic.
fn node_type_of(raw: &str) -> NodeType {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix("DEVICE_TYPE_").unwrap_or(trimmed);
    bare.replace(['_', '-', ' '], "")
        .parse()
        .unwrap_or_default()
}
