// ── Layout engine ──
//
// Stateless transforms from a view's node/link graph to display
// coordinates. Each algorithm computes a position per node key; `apply`
// writes those positions into the view's locations, creating a location
// for any node that lacks one.

pub mod circular;
pub mod force_directed;
pub mod hierarchical;
pub mod radial;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{Layout, Topology, TopologyLocation};

pub use force_directed::ForceParams;

/// Positions keyed by view node key.
pub type Positions = BTreeMap<String, (f32, f32)>;

/// Drawing surface the layouts place nodes on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 857.0,
        }
    }
}

impl Canvas {
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Largest ring radius that keeps `padding` clear of the nearer edge.
    pub(crate) fn max_radius(&self, padding: f32) -> f32 {
        self.width.min(self.height) / 2.0 - padding
    }
}

/// Lay out `topology` in place. `Layout::Location` leaves it untouched.
pub fn apply(layout: Layout, topology: &mut Topology, canvas: Canvas) {
    apply_with_rng(layout, topology, canvas, &mut rand::thread_rng());
}

/// [`apply`] with a caller-supplied source of randomness for the
/// force-directed initial placement.
pub fn apply_with_rng<R: Rng + ?Sized>(
    layout: Layout,
    topology: &mut Topology,
    canvas: Canvas,
    rng: &mut R,
) {
    let positions = match layout {
        Layout::Location => return,
        Layout::Hierarchical => hierarchical::positions(topology, canvas),
        Layout::Circular => circular::positions(topology, canvas),
        Layout::Radial => radial::positions(topology, canvas),
        Layout::ForceDirected => {
            force_directed::positions(topology, canvas, &ForceParams::default(), rng)
        }
    };
    write_positions(topology, &positions);
}

fn write_positions(topology: &mut Topology, positions: &Positions) {
    for (key, node) in &topology.nodes {
        let Some(&(x, y)) = positions.get(key) else {
            continue;
        };
        topology
            .locations
            .entry(key.clone())
            .or_insert_with(|| TopologyLocation::named(node.location.clone()))
            .set_svg(x, y);
    }
}

// ── Shared graph helpers ─────────────────────────────────────────────

/// Undirected adjacency over the view's node keys.
///
/// Links whose endpoints are not both view nodes are ignored, as are
/// self-loops.
pub(crate) struct Graph<'a> {
    adjacency: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> Graph<'a> {
    pub(crate) fn new(topology: &'a Topology) -> Self {
        let mut adjacency: BTreeMap<&str, BTreeSet<&str>> = topology
            .nodes
            .keys()
            .map(|k| (k.as_str(), BTreeSet::new()))
            .collect();

        for link in topology.links.values() {
            let (a, z) = (link.aside.as_str(), link.zside.as_str());
            if a == z || !adjacency.contains_key(a) || !adjacency.contains_key(z) {
                continue;
            }
            adjacency.entry(a).or_default().insert(z);
            adjacency.entry(z).or_default().insert(a);
        }

        Self { adjacency }
    }

    pub(crate) fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.adjacency.keys().copied()
    }

    pub(crate) fn degree(&self, key: &str) -> usize {
        self.adjacency.get(key).map_or(0, BTreeSet::len)
    }

    /// The most connected node; the first in key order wins a tie.
    pub(crate) fn root(&self) -> Option<&'a str> {
        let mut best: Option<(&str, usize)> = None;
        for key in self.keys() {
            let degree = self.degree(key);
            if best.is_none_or(|(_, d)| degree > d) {
                best = Some((key, degree));
            }
        }
        best.map(|(key, _)| key)
    }

    /// Breadth-first hop count from `root`. Unreachable nodes are absent.
    pub(crate) fn levels_from(&self, root: &'a str) -> BTreeMap<&'a str, usize> {
        let mut levels = BTreeMap::from([(root, 0)]);
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            let next = levels.get(current).map_or(0, |l| l + 1);
            for &neighbor in self.adjacency.get(current).into_iter().flatten() {
                if !levels.contains_key(neighbor) {
                    levels.insert(neighbor, next);
                    queue.push_back(neighbor);
                }
            }
        }
        levels
    }
}

/// Group keys by level, keeping key order within each level.
pub(crate) fn group_by_level<'a>(
    levels: &BTreeMap<&'a str, usize>,
) -> BTreeMap<usize, Vec<&'a str>> {
    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (&key, &level) in levels {
        groups.entry(level).or_default().push(key);
    }
    groups
}

/// Spread `keys` evenly around a ring, the first one at the top.
#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
pub(crate) fn ring(
    positions: &mut Positions,
    keys: &[&str],
    (cx, cy): (f32, f32),
    radius: f32,
) {
    let count = keys.len() as f64;
    for (index, key) in keys.iter().enumerate() {
        let angle = TAU * index as f64 / count - FRAC_PI_2;
        let x = f64::from(cx) + f64::from(radius) * angle.cos();
        let y = f64::from(cy) + f64::from(radius) * angle.sin();
        positions.insert((*key).to_owned(), (x as f32, y as f32));
    }
}
