// Rings ordered by connectivity.
//
// Up to six nodes share one ring. Larger graphs fill rings of capacity
// 1, 6, 12, 18, 24, 24, ... from the inside out, most connected first, so
// the hub ends up in the middle.

use super::{Canvas, Graph, Positions, ring};
use crate::model::Topology;

const PADDING: f32 = 80.0;
const RING_CAPACITY: [usize; 5] = [1, 6, 12, 18, 24];
const SINGLE_RING_MAX: usize = 6;
const SINGLE_RING_SCALE: f32 = 0.6;
const INNER_RING_SCALE: f32 = 0.2;

#[allow(clippy::as_conversions, clippy::cast_precision_loss)]
pub fn positions(topology: &Topology, canvas: Canvas) -> Positions {
    let graph = Graph::new(topology);
    let center = canvas.center();
    let max_radius = canvas.max_radius(PADDING);

    let mut ordered: Vec<&str> = graph.keys().collect();
    ordered.sort_by_key(|key| std::cmp::Reverse(graph.degree(key)));

    let mut positions = Positions::new();
    match graph.len() {
        0 => {}
        1 => {
            positions.insert(ordered[0].to_owned(), center);
        }
        n if n <= SINGLE_RING_MAX => {
            ring(&mut positions, &ordered, center, max_radius * SINGLE_RING_SCALE);
        }
        _ => {
            let rings = partition(&ordered);
            let outermost = (rings.len() - 1) as f32;
            for (index, keys) in rings.iter().enumerate() {
                if index == 0 && keys.len() == 1 {
                    positions.insert(keys[0].to_owned(), center);
                    continue;
                }
                // Linear from 20% (first ring) to 100% (last ring) of max radius.
                let scale =
                    INNER_RING_SCALE + (1.0 - INNER_RING_SCALE) * index as f32 / outermost;
                ring(&mut positions, keys, center, max_radius * scale);
            }
        }
    }
    positions
}

/// Cut `ordered` into consecutive rings; the last capacity repeats.
fn partition<'a, 'k>(ordered: &'a [&'k str]) -> Vec<&'a [&'k str]> {
    let mut rings = Vec::new();
    let mut rest = ordered;
    let mut index = 0;
    while !rest.is_empty() {
        let capacity = RING_CAPACITY[index.min(RING_CAPACITY.len() - 1)];
        let (ring, tail) = rest.split_at(capacity.min(rest.len()));
        rings.push(ring);
        rest = tail;
        index += 1;
    }
    rings
}
