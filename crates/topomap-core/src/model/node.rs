// ── Node domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of managed element a node stands for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum NodeType {
    Router,
    Switch,
    Firewall,
    LoadBalancer,
    AccessPoint,
    Server,
    Storage,
    Gateway,
    #[default]
    Generic,
    /// Several raw nodes collapsed into one view node.
    NetworkAggregation,
}

/// A topology vertex.
///
/// `location` is a foreign key into the location collection; the store
/// refuses to build a view for a node whose location is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyNode {
    pub node_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "Type")]
    pub node_type: NodeType,
    /// Aggregation multiplicity in views. Always 1 in the store.
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl TopologyNode {
    pub fn new(
        node_id: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        node_type: NodeType,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            name: name.into(),
            location: location.into(),
            node_type,
            count: 1,
        }
    }

    /// Overwrite every field the patch actually sets.
    ///
    /// Empty strings and `Generic` count as "not set". The id and the view
    /// multiplicity are never patched.
    pub(crate) fn merge(&mut self, patch: &Self) {
        if !patch.name.is_empty() {
            self.name.clone_from(&patch.name);
        }
        if !patch.location.is_empty() {
            self.location.clone_from(&patch.location);
        }
        if patch.node_type != NodeType::Generic {
            self.node_type = patch.node_type;
        }
    }
}
