// Concentric rings around the most connected node.
//
// Breadth-first level L sits on a ring of radius L * spacing. Nodes the
// traversal never reaches get a ring of their own outside the deepest one.

use super::{Canvas, Graph, Positions, group_by_level, ring};
use crate::model::Topology;

const PADDING: f32 = 80.0;
const MIN_RING_SPACING: f32 = 60.0;

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
pub fn positions(topology: &Topology, canvas: Canvas) -> Positions {
    let graph = Graph::new(topology);
    let Some(root) = graph.root() else {
        return Positions::new();
    };

    let mut levels = graph.levels_from(root);
    let deepest = levels.values().copied().max().unwrap_or(0);
    for key in graph.keys() {
        levels.entry(key).or_insert(deepest + 1);
    }
    let max_level = levels.values().copied().max().unwrap_or(0);

    let center = canvas.center();
    let max_radius = canvas.max_radius(PADDING);
    let mut spacing = max_radius / (max_level + 1) as f32;
    if max_level > 0 {
        spacing = spacing.max(MIN_RING_SPACING);
    }

    let mut positions = Positions::new();
    for (level, keys) in group_by_level(&levels) {
        if level == 0 {
            for key in keys {
                positions.insert(key.to_owned(), center);
            }
        } else {
            let radius = (spacing * level as f32).min(max_radius);
            ring(&mut positions, &keys, center, radius);
        }
    }
    positions
}
