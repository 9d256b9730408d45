// topomap-api: Async client for remote inventory queries.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::InventoryClient;
pub use error::Error;
pub use models::{InventoryQuery, QueryResponse, Verb};
pub use transport::{TlsMode, TransportConfig};
