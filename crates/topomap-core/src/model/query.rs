// ── View query ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Layout applied to a view.
///
/// `Location` keeps geographic coordinates and collapses nodes per
/// location; every other mode computes fresh coordinates per node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Layout {
    #[default]
    Location,
    Hierarchical,
    Circular,
    Radial,
    ForceDirected,
}

/// Parameters of a view request.
///
/// `x, y, x1, y1` bound the view in display coordinates. All four zero
/// means no bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyQuery {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub x1: f32,
    #[serde(default)]
    pub y1: f32,
    #[serde(default)]
    pub layout: Layout,
}

impl TopologyQuery {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn with_bbox(mut self, x: f32, y: f32, x1: f32, y1: f32) -> Self {
        self.x = x;
        self.y = y;
        self.x1 = x1;
        self.y1 = y1;
        self
    }

    /// Whether any bounding-box edge is set.
    pub fn has_bbox(&self) -> bool {
        self.x != 0.0 || self.y != 0.0 || self.x1 != 0.0 || self.y1 != 0.0
    }

    /// Inclusive containment test against the bounding box.
    pub fn contains(&self, svg_x: f32, svg_y: f32) -> bool {
        (self.x..=self.x1).contains(&svg_x) && (self.y..=self.y1).contains(&svg_y)
    }
}
