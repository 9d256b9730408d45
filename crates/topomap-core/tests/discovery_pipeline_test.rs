#![allow(clippy::unwrap_used)]
// End-to-end discovery over a static five-device inventory: records are
// converted, ports matched into links, and views built on top.

use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::{Value, json};

use topomap_core::geo::{CityTable, project};
use topomap_core::{
    Element, Layout, LinkDirection, NetworkDeviceAdapter, NodeType, StaticInventory,
    TopologyConfig, TopologyNode, TopologyQuery, TopologyService,
};

const DEVICES: [(&str, &str); 5] = [
    ("R1", "DEVICE_TYPE_ROUTER"),
    ("R2", "DEVICE_TYPE_ROUTER"),
    ("SW1", "DEVICE_TYPE_SWITCH"),
    ("SW2", "DEVICE_TYPE_SWITCH"),
    ("FW1", "DEVICE_TYPE_FIREWALL"),
];

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
fn coordinates(index: usize) -> (f64, f64) {
    let offset = index as f64 * 0.1;
    (37.7749 + offset, -122.4194 + offset)
}

fn mock_inventory() -> Value {
    let devices: Vec<Value> = DEVICES
        .iter()
        .enumerate()
        .map(|(i, (id, device_type))| {
            let n = i + 1;
            let (lat, lon) = coordinates(n);
            json!({
                "id": id,
                "equipment_info": {
                    "sys_name": id,
                    "vendor": "Acme",
                    "device_type": device_type,
                    "location": format!("DataCenter-{n}"),
                    "latitude": lat,
                    "longitude": lon
                },
                "physicals": {
                    "physical-1": { "ports": [{"id": "port-1"}, {"id": "port-2"}] }
                }
            })
        })
        .collect();
    json!({ "list": devices })
}

fn service() -> TopologyService<NetworkDeviceAdapter, StaticInventory> {
    let source = StaticInventory::from_json(&mock_inventory().to_string()).unwrap();
    let adapter = NetworkDeviceAdapter::new("inventory", 0, Arc::new(CityTable::default()));
    TopologyService::new(TopologyConfig::default(), adapter, source)
}

fn render(topology: &topomap_core::Topology) -> String {
    let mut out = String::new();
    for (key, location) in &topology.locations {
        writeln!(out, "{key} ({}, {})", location.svg_x, location.svg_y).unwrap();
    }
    out
}

#[tokio::test]
async fn discovery_pairs_ports_greedily_across_devices() {
    let svc = service();
    let report = svc.discover_now().await.unwrap();

    // FW1 pairs both ports with R1, R2 with SW1; SW2 is left over.
    assert_eq!((report.nodes, report.locations, report.links), (5, 5, 4));
    let links = svc.store().links_snapshot();
    let ids: Vec<&str> = links.iter().map(|l| l.link_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "networkdevice<FW1>.port<port-1><->networkdevice<R1>.port<port-1>",
            "networkdevice<FW1>.port<port-2><->networkdevice<R1>.port<port-2>",
            "networkdevice<R2>.port<port-1><->networkdevice<SW1>.port<port-1>",
            "networkdevice<R2>.port<port-2><->networkdevice<SW1>.port<port-2>",
        ]
    );
    assert_eq!(svc.store().node("FW1").unwrap().node_type, NodeType::Firewall);
}

#[tokio::test]
async fn rediscovery_is_idempotent() {
    let svc = service();
    svc.discover_now().await.unwrap();
    svc.discover_now().await.unwrap();
    assert_eq!(svc.store().counts(), (5, 4, 5));
}

#[tokio::test]
async fn per_node_view_resolves_ports_to_devices() {
    let svc = service();
    svc.discover_now().await.unwrap();

    let view = svc.get(&TopologyQuery::new(Layout::Hierarchical)).await.unwrap();
    assert_eq!(view.name, "L1");
    assert_eq!(view.nodes.len(), 5);
    let links: Vec<&str> = view.links.keys().map(String::as_str).collect();
    assert_eq!(links, vec!["FW1R1", "R2SW1"]);
    assert_eq!(view.links["FW1R1"].direction, LinkDirection::Bidirectional);

    insta::assert_snapshot!(render(&view), @r"
    FW1 (775, 50)
    R1 (1000, 150)
    R2 (925, 50)
    SW1 (1075, 50)
    SW2 (1225, 50)
    ");
}

#[tokio::test]
async fn location_view_keeps_projected_coordinates() {
    let svc = service();
    svc.discover_now().await.unwrap();

    let view = svc.get(&TopologyQuery::new(Layout::Location)).await.unwrap();
    assert_eq!(view.nodes.len(), 5);
    assert_eq!(view.links.len(), 2);

    let (lat, lon) = coordinates(1);
    let dc1 = &view.locations["DataCenter-1"];
    assert_eq!((dc1.svg_x, dc1.svg_y), project(lat, lon));
    assert!(view.nodes.values().all(|n| n.count == 1));
}

#[tokio::test]
async fn bounding_box_drops_nodes_and_their_links() {
    let svc = service();
    svc.discover_now().await.unwrap();

    let (lat, lon) = coordinates(1);
    let (x, y) = project(lat, lon);
    let query = TopologyQuery::new(Layout::Location).with_bbox(x - 0.2, y - 0.2, x + 0.2, y + 0.2);
    let view = svc.get(&query).await.unwrap();

    let keys: Vec<&str> = view.nodes.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["DataCenter-1"]);
    assert!(view.links.is_empty());
}

#[tokio::test]
async fn posted_node_shows_up_until_deleted() {
    let svc = service();
    svc.discover_now().await.unwrap();

    let extra = TopologyNode::new("LB1", "LB1", "DataCenter-2", NodeType::LoadBalancer);
    svc.store().post(vec![Element::from(extra.clone())]).await.unwrap();
    let view = svc.get(&TopologyQuery::new(Layout::Circular)).await.unwrap();
    assert!(view.nodes.contains_key("LB1"));

    // Two devices at one location collapse under the location layout.
    let view = svc.get(&TopologyQuery::new(Layout::Location)).await.unwrap();
    assert_eq!(view.nodes["DataCenter-2"].count, 2);
    assert_eq!(view.nodes["DataCenter-2"].node_type, NodeType::NetworkAggregation);

    svc.store().delete(vec![Element::from(extra)]).await.unwrap();
    let view = svc.get(&TopologyQuery::new(Layout::Circular)).await.unwrap();
    assert!(!view.nodes.contains_key("LB1"));
}
