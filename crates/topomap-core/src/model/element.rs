// ── CRUD batch elements ──

use serde::{Deserialize, Serialize};
use strum::Display;

use super::{TopologyLink, TopologyLocation, TopologyNode, TopologyQuery};

/// One entry of a CRUD batch, tagged with its kind.
///
/// `Query` has no backing collection; sending it through a mutation is
/// rejected as unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[serde(tag = "Kind", content = "Value")]
pub enum Element {
    Node(TopologyNode),
    Link(TopologyLink),
    Location(TopologyLocation),
    Query(TopologyQuery),
}

impl From<TopologyNode> for Element {
    fn from(node: TopologyNode) -> Self {
        Self::Node(node)
    }
}

impl From<TopologyLink> for Element {
    fn from(link: TopologyLink) -> Self {
        Self::Link(link)
    }
}

impl From<TopologyLocation> for Element {
    fn from(location: TopologyLocation) -> Self {
        Self::Location(location)
    }
}

/// Store actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Action {
    /// Insert, overwriting any entity with the same key.
    Post,
    /// Replace an existing entity.
    Put,
    /// Merge the set fields into an existing entity.
    Patch,
    Delete,
    /// Reads go through the view query, not the batch dispatcher.
    Get,
}
