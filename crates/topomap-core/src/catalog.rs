// ── Topology catalog ──
//
// Registry of the topologies a process serves, keyed by the inventory
// service and area each one is discovered from.

use dashmap::DashMap;
use tracing::debug;

use crate::model::TopologyMetadata;

#[derive(Debug, Default)]
pub struct TopologyCatalog {
    entries: DashMap<(String, u8), TopologyMetadata>,
}

impl TopologyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a topology. Re-registering the same service and area
    /// replaces the entry.
    pub fn add(&self, metadata: TopologyMetadata) {
        debug!(name = %metadata.name, service = %metadata.service_name, area = metadata.service_area, "topology registered");
        self.entries
            .insert((metadata.service_name.clone(), metadata.service_area), metadata);
    }

    pub fn remove(&self, service_name: &str, service_area: u8) -> Option<TopologyMetadata> {
        self.entries
            .remove(&(service_name.to_owned(), service_area))
            .map(|(_, v)| v)
    }

    pub fn get(&self, service_name: &str, service_area: u8) -> Option<TopologyMetadata> {
        self.entries
            .get(&(service_name.to_owned(), service_area))
            .map(|r| r.value().clone())
    }

    /// All entries, sorted by name.
    pub fn list(&self) -> Vec<TopologyMetadata> {
        let mut all: Vec<_> = self.entries.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn meta(name: &str, service: &str, area: u8) -> TopologyMetadata {
        TopologyMetadata {
            name: name.into(),
            service_name: service.into(),
            service_area: area,
        }
    }

    #[test]
    fn keyed_by_service_and_area() {
        let catalog = TopologyCatalog::new();
        catalog.add(meta("L1", "inventory", 0));
        catalog.add(meta("L1-lab", "inventory", 1));
        catalog.add(meta("L1-renamed", "inventory", 0));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("inventory", 0).unwrap().name, "L1-renamed");
    }

    #[test]
    fn list_is_sorted_and_remove_works() {
        let catalog = TopologyCatalog::new();
        catalog.add(meta("b", "s2", 0));
        catalog.add(meta("a", "s1", 0));
        let names: Vec<_> = catalog.list().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(catalog.remove("s1", 0).is_some());
        assert!(catalog.get("s1", 0).is_none());
    }
}
