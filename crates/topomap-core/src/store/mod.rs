// ── Topology store ──
//
// Authoritative node, link, and location collections for one topology.
// Batch mutations and view construction are serialized by one lock, so a
// view is a point-in-time snapshot of all three collections.

pub(crate) mod collection;
mod view;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::debug;

use crate::error::CoreError;
use crate::layout::{self, Canvas};
use crate::model::{
    Action, Element, Topology, TopologyLink, TopologyLocation, TopologyNode, TopologyQuery,
};

use collection::EntityCollection;
pub use collection::Keyed;

// ── Primary keys ─────────────────────────────────────────────────────

impl Keyed for TopologyNode {
    fn primary_key(&self) -> &str {
        &self.node_id
    }
}

impl Keyed for TopologyLink {
    fn primary_key(&self) -> &str {
        &self.link_id
    }
}

impl Keyed for TopologyLocation {
    fn primary_key(&self) -> &str {
        &self.location
    }
}

/// Field-wise merge used by PATCH.
trait Merge {
    fn merge_from(&mut self, patch: &Self);
}

impl Merge for TopologyNode {
    fn merge_from(&mut self, patch: &Self) {
        self.merge(patch);
    }
}

impl Merge for TopologyLink {
    fn merge_from(&mut self, patch: &Self) {
        self.merge(patch);
    }
}

impl Merge for TopologyLocation {
    fn merge_from(&mut self, patch: &Self) {
        self.merge(patch);
    }
}

// ── TopologyStore ────────────────────────────────────────────────────

/// Store for one named topology.
///
/// | Action | Effect |
/// |--------|--------|
/// | POST   | insert, overwriting an entity with the same key |
/// | PUT    | replace an existing entity (`NotFound` otherwise) |
/// | PATCH  | merge set fields into an existing entity (`NotFound` otherwise) |
/// | DELETE | remove; deleting an absent key is a no-op |
pub struct TopologyStore {
    name: String,
    nodes: EntityCollection<TopologyNode>,
    links: EntityCollection<TopologyLink>,
    locations: EntityCollection<TopologyLocation>,
    lock: Mutex<()>,
}

impl TopologyStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: EntityCollection::new(),
            links: EntityCollection::new(),
            locations: EntityCollection::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Batch actions ────────────────────────────────────────────────

    pub async fn post(&self, batch: Vec<Element>) -> Result<(), CoreError> {
        self.dispatch(Action::Post, batch).await
    }

    pub async fn put(&self, batch: Vec<Element>) -> Result<(), CoreError> {
        self.dispatch(Action::Put, batch).await
    }

    pub async fn patch(&self, batch: Vec<Element>) -> Result<(), CoreError> {
        self.dispatch(Action::Patch, batch).await
    }

    pub async fn delete(&self, batch: Vec<Element>) -> Result<(), CoreError> {
        self.dispatch(Action::Delete, batch).await
    }

    /// Apply `action` to every element in order.
    ///
    /// Stops at the first failure; elements before it stay applied.
    pub async fn dispatch(&self, action: Action, batch: Vec<Element>) -> Result<(), CoreError> {
        let _guard = self.lock.lock().await;
        let size = batch.len();
        for element in batch {
            self.apply(action, element)?;
        }
        debug!(topology = %self.name, %action, size, "batch applied");
        Ok(())
    }

    fn apply(&self, action: Action, element: Element) -> Result<(), CoreError> {
        match element {
            Element::Node(node) => apply_to(&self.nodes, action, node, "Node"),
            Element::Link(link) => apply_to(&self.links, action, link, "Link"),
            Element::Location(location) => {
                apply_to(&self.locations, action, location, "Location")
            }
            other @ Element::Query(_) => Err(CoreError::UnsupportedAction {
                action,
                kind: other.to_string(),
            }),
        }
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Build a view for `query` and lay it out on `canvas`.
    ///
    /// The lock is held while the view is assembled; layout runs on the
    /// detached view afterwards.
    pub async fn get(&self, query: &TopologyQuery, canvas: Canvas) -> Result<Topology, CoreError> {
        let mut topology = {
            let _guard = self.lock.lock().await;
            view::build(self, query)?
        };
        layout::apply(query.layout, &mut topology, canvas);
        debug!(
            topology = %self.name,
            layout = %query.layout,
            nodes = topology.nodes.len(),
            links = topology.links.len(),
            "view built"
        );
        Ok(topology)
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn nodes_snapshot(&self) -> Arc<Vec<Arc<TopologyNode>>> {
        self.nodes.snapshot()
    }

    pub fn links_snapshot(&self) -> Arc<Vec<Arc<TopologyLink>>> {
        self.links.snapshot()
    }

    pub fn locations_snapshot(&self) -> Arc<Vec<Arc<TopologyLocation>>> {
        self.locations.snapshot()
    }

    pub fn node(&self, node_id: &str) -> Option<Arc<TopologyNode>> {
        self.nodes.get(node_id)
    }

    pub fn link(&self, link_id: &str) -> Option<Arc<TopologyLink>> {
        self.links.get(link_id)
    }

    pub fn location(&self, location: &str) -> Option<Arc<TopologyLocation>> {
        self.locations.get(location)
    }

    pub fn subscribe_nodes(&self) -> watch::Receiver<Arc<Vec<Arc<TopologyNode>>>> {
        self.nodes.subscribe()
    }

    pub fn subscribe_links(&self) -> watch::Receiver<Arc<Vec<Arc<TopologyLink>>>> {
        self.links.subscribe()
    }

    /// `(nodes, links, locations)` currently stored.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.nodes.len(), self.links.len(), self.locations.len())
    }
}

fn apply_to<T>(
    collection: &EntityCollection<T>,
    action: Action,
    entity: T,
    kind: &str,
) -> Result<(), CoreError>
where
    T: Keyed + Merge + Clone + Send + Sync + 'static,
{
    match action {
        Action::Post => {
            collection.upsert(entity);
            Ok(())
        }
        Action::Put => {
            let key = entity.primary_key().to_owned();
            if collection.replace(entity) {
                Ok(())
            } else {
                Err(CoreError::not_found(kind, &key))
            }
        }
        Action::Patch => {
            let key = entity.primary_key().to_owned();
            if collection.update(&key, |stored| stored.merge_from(&entity)) {
                Ok(())
            } else {
                Err(CoreError::not_found(kind, &key))
            }
        }
        Action::Delete => {
            collection.remove(entity.primary_key());
            Ok(())
        }
        Action::Get => Err(CoreError::UnsupportedAction {
            action,
            kind: kind.to_owned(),
        }),
    }
}
