// ── Topology domain model ──
//
// Authoritative entity types (nodes, links, locations), the query and
// view shapes handed across the store boundary, and the id grammar that
// ties sub-element links back to their owning nodes.

pub mod element;
pub mod ids;
pub mod link;
pub mod location;
pub mod node;
pub mod query;
pub mod topology;

// ── Re-exports ──────────────────────────────────────────────────────

pub use element::{Action, Element};
pub use link::{LinkDirection, LinkStatus, TopologyLink};
pub use location::TopologyLocation;
pub use node::{NodeType, TopologyNode};
pub use query::{Layout, TopologyQuery};
pub use topology::{Topology, TopologyMetadata};
