//! Topology discovery, storage and layout for topomap.
//!
//! This crate owns the domain model and the business logic between the
//! inventory client in `topomap-api` and the CLI:
//!
//! - **[`TopologyService`]**: lifecycle for one topology.
//!   [`activate()`](TopologyService::activate) schedules a one-shot
//!   discovery after a settle delay;
//!   [`discover_now()`](TopologyService::discover_now) runs it inline.
//!
//! - **[`TopologyStore`]**: authoritative node, link and location
//!   collections (`DashMap` + `tokio::sync::watch`), batch CRUD over
//!   [`Element`]s, and query-shaped views.
//!
//! - **[`DiscoveryAdapter`]**: per-inventory conversion of raw records
//!   into nodes, locations and the sub-elements the [`matcher`] pairs into
//!   links. [`NetworkDeviceAdapter`] is the physical-layer implementation.
//!
//! - **[`layout`]**: hierarchical, circular, radial and force-directed
//!   placement of view nodes; [`geo`] projects coordinates for the
//!   location layout.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod geo;
pub mod layout;
pub mod matcher;
pub mod model;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::TopologyCatalog;
pub use config::TopologyConfig;
pub use discovery::{DiscoveryAdapter, InventorySource, NetworkDeviceAdapter, StaticInventory};
pub use error::CoreError;
pub use layout::Canvas;
pub use service::{DiscoveryReport, ServiceState, TopologyService};
pub use store::TopologyStore;

pub use model::{
    Action, Element, Layout, LinkDirection, LinkStatus, NodeType, Topology, TopologyLink,
    TopologyLocation, TopologyMetadata, TopologyNode, TopologyQuery,
};
