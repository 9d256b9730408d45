// ── Location domain types ──

use serde::{Deserialize, Serialize};

/// A place nodes live at, with its display coordinates.
///
/// `svg_x`/`svg_y` start out as the geographic projection of
/// `latitude`/`longitude` and are overwritten in views by whichever layout
/// ran last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopologyLocation {
    pub location: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub svg_x: f32,
    #[serde(default)]
    pub svg_y: f32,
}

impl TopologyLocation {
    /// Location with no coordinates yet.
    pub fn named(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn set_svg(&mut self, x: f32, y: f32) {
        self.svg_x = x;
        self.svg_y = y;
    }

    pub(crate) fn merge(&mut self, patch: &Self) {
        if patch.latitude != 0.0 || patch.longitude != 0.0 {
            self.latitude = patch.latitude;
            self.longitude = patch.longitude;
        }
        if patch.svg_x != 0.0 || patch.svg_y != 0.0 {
            self.set_svg(patch.svg_x, patch.svg_y);
        }
    }
}
