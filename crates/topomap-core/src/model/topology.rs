// ── View and catalog types ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{TopologyLink, TopologyLocation, TopologyNode};

/// A query-shaped, read-only snapshot of the store.
///
/// Built fresh per request and never written back. Under the location
/// layout `nodes` and `locations` are keyed by location; otherwise by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Topology {
    pub name: String,
    #[serde(default)]
    pub nodes: BTreeMap<String, TopologyNode>,
    #[serde(default)]
    pub links: BTreeMap<String, TopologyLink>,
    #[serde(default)]
    pub locations: BTreeMap<String, TopologyLocation>,
}

impl Topology {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Catalog entry describing one discoverable topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyMetadata {
    pub name: String,
    pub service_name: String,
    pub service_area: u8,
}
