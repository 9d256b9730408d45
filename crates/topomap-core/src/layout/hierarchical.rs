// Layered rows: the most connected node on top, each breadth-first level
// one row further down.
//
// Nodes the traversal never reaches are put on the root's row.

use super::{Canvas, Graph, Positions, group_by_level};
use crate::model::Topology;

const PADDING: f32 = 50.0;
const SPACING_X: f32 = 150.0;
const SPACING_Y: f32 = 100.0;

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
pub fn positions(topology: &Topology, canvas: Canvas) -> Positions {
    let graph = Graph::new(topology);
    let Some(root) = graph.root() else {
        return Positions::new();
    };

    let mut levels = graph.levels_from(root);
    for key in graph.keys() {
        levels.entry(key).or_insert(0);
    }

    let mut positions = Positions::new();
    for (level, row) in group_by_level(&levels) {
        let y = (PADDING + level as f32 * SPACING_Y).min(canvas.height - PADDING);
        let row_width = (row.len() - 1) as f32 * SPACING_X;
        let start_x = (canvas.width - row_width) / 2.0;
        for (index, key) in row.into_iter().enumerate() {
            positions.insert(key.to_owned(), (start_x + index as f32 * SPACING_X, y));
        }
    }
    positions
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::tests::{graph, star};

    #[test]
    fn star_puts_hub_on_top_and_leaves_below() {
        let positions = positions(&star(), Canvas::default());
        assert_eq!(positions["hub"], (1000.0, 50.0));
        for leaf in ["leaf1", "leaf2", "leaf3", "leaf4"] {
            assert!((positions[leaf].1 - 150.0).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn rows_are_centered_and_evenly_spaced() {
        let positions = positions(&star(), Canvas::default());
        let xs: Vec<f32> = ["leaf1", "leaf2", "leaf3", "leaf4"]
            .iter()
            .map(|k| positions[*k].0)
            .collect();
        assert_eq!(xs, vec![775.0, 925.0, 1075.0, 1225.0]);
    }

    #[test]
    fn deep_chains_are_clamped_to_the_canvas() {
        let keys: Vec<String> = (0..12).map(|i| format!("n{i:02}")).collect();
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let positions = positions(&graph(&refs, &edges), Canvas::default());
        let lowest = positions.values().map(|p| p.1).fold(f32::MIN, f32::max);
        assert!((lowest - (857.0 - 50.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn disconnected_nodes_share_the_root_row() {
        let topology = graph(&["a", "b", "island"], &[("a", "b")]);
        let positions = positions(&topology, Canvas::default());
        assert!((positions["island"].1 - positions["a"].1).abs() < f32::EPSILON);
        assert!((positions["island"].0 - positions["a"].0).abs() > 1.0);
    }

    #[test]
    fn empty_view_has_no_positions() {
        assert!(positions(&graph(&[], &[]), Canvas::default()).is_empty());
    }
}
