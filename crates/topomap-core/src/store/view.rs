// View assembly.
//
// Nodes are filtered by bounding box and keyed either per node or per
// location. Links are resolved from sub-element ids to their owning nodes
// (and, per location, to locations), dropped when an end was filtered out
// or both ends collapse onto one key, and merged by view link id.

use std::collections::HashMap;
use std::collections::btree_map::Entry;

use super::TopologyStore;
use crate::error::CoreError;
use crate::model::ids::root_id_of;
use crate::model::{
    Layout, LinkDirection, NodeType, Topology, TopologyLink, TopologyLocation, TopologyQuery,
};

pub(super) fn build(store: &TopologyStore, query: &TopologyQuery) -> Result<Topology, CoreError> {
    let mut view = Topology::named(store.name());
    let by_location = query.layout == Layout::Location;

    // node id -> view key, for every node that passed the filter
    let mut included: HashMap<String, String> = HashMap::new();

    for node in store.nodes.snapshot().iter() {
        let stored = store.locations.get(&node.location).ok_or_else(|| {
            CoreError::InvariantViolation {
                message: format!(
                    "node {} references missing location {:?}",
                    node.node_id, node.location
                ),
            }
        })?;
        if query.has_bbox() && !query.contains(stored.svg_x, stored.svg_y) {
            continue;
        }

        let mut view_node = (**node).clone();
        view_node.count = 1;
        let view_location = if by_location {
            view_node.node_id.clone_from(&node.location);
            view_node.name.clone_from(&node.location);
            (*stored).clone()
        } else {
            view_node.location.clone_from(&node.node_id);
            TopologyLocation::named(node.node_id.clone())
        };
        let key = view_node.location.clone();
        included.insert(node.node_id.clone(), key.clone());

        match view.nodes.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(view_node);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                existing.count += 1;
                existing.node_type = NodeType::NetworkAggregation;
            }
        }
        view.locations.insert(key, view_location);
    }

    for link in store.links.snapshot().iter() {
        let (Some(aside), Some(zside)) = (
            included.get(root_id_of(&link.aside)),
            included.get(root_id_of(&link.zside)),
        ) else {
            continue;
        };
        if aside == zside {
            continue;
        }
        add_view_link(&mut view, aside, zside, link.direction);
    }

    Ok(view)
}

fn add_view_link(view: &mut Topology, aside: &str, zside: &str, direction: LinkDirection) {
    let link = TopologyLink::view(aside, zside, direction);
    match view.links.entry(link.link_id.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(link);
        }
        Entry::Occupied(mut slot) => {
            let existing = slot.get_mut();
            existing.direction = existing.direction.merge(direction);
        }
    }
}
