// Pseudo-cylindrical world projection onto the 2000 x 857 display canvas.
//
// Each row holds the relative parallel length and the relative distance
// from the equator at one 5 degree latitude step. Values in between are
// interpolated linearly; the 90 degree row covers anything beyond.

const TABLE: [(f64, f64); 19] = [
    (1.0000, 0.0000),
    (0.9986, 0.0620),
    (0.9954, 0.1240),
    (0.9900, 0.1860),
    (0.9822, 0.2480),
    (0.9730, 0.3100),
    (0.9600, 0.3720),
    (0.9427, 0.4340),
    (0.9216, 0.4958),
    (0.8962, 0.5571),
    (0.8679, 0.6176),
    (0.8350, 0.6769),
    (0.7986, 0.7346),
    (0.7597, 0.7903),
    (0.7186, 0.8435),
    (0.6732, 0.8936),
    (0.6213, 0.9394),
    (0.5722, 0.9761),
    (0.5322, 1.0000),
];

const STEP_DEGREES: f64 = 5.0;

/// Display coordinates of latitude 0, longitude 0.
pub const NULL_ISLAND: (f32, f32) = (986.0, 497.0);

// Hemisphere scales, in pixels from the origin to the map edge.
const SCALE_EAST: f64 = 1014.0;
const SCALE_WEST: f64 = 986.0;
const SCALE_NORTH: f64 = 497.0;
const SCALE_SOUTH: f64 = 360.0;

/// Project `(latitude, longitude)` in degrees to `(x, y)` display coordinates.
///
/// North is up: positive latitudes map above [`NULL_ISLAND`].
#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
pub fn project(latitude: f64, longitude: f64) -> (f32, f32) {
    let (plen, pdfe) = interpolate(latitude.abs());

    let (origin_x, origin_y) = (f64::from(NULL_ISLAND.0), f64::from(NULL_ISLAND.1));
    let span = longitude.abs().min(180.0) / 180.0;
    let x = if longitude >= 0.0 {
        origin_x + plen * span * SCALE_EAST
    } else {
        origin_x - plen * span * SCALE_WEST
    };
    let y = if latitude >= 0.0 {
        origin_y - pdfe * SCALE_NORTH
    } else {
        origin_y + pdfe * SCALE_SOUTH
    };

    (x as f32, y as f32)
}

#[allow(
    clippy::as_conversions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn interpolate(abs_latitude: f64) -> (f64, f64) {
    let last = TABLE.len() - 1;
    let position = abs_latitude.min(90.0) / STEP_DEGREES;
    let index = (position.floor() as usize).min(last);
    if index == last {
        return TABLE[last];
    }
    let frac = position - position.floor();
    let (plen_lo, pdfe_lo) = TABLE[index];
    let (plen_hi, pdfe_hi) = TABLE[index + 1];
    (
        plen_lo + (plen_hi - plen_lo) * frac,
        pdfe_lo + (pdfe_hi - pdfe_lo) * frac,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: (f32, f32), expected: (f32, f32)) -> bool {
        (actual.0 - expected.0).abs() < 0.01 && (actual.1 - expected.1).abs() < 0.01
    }

    #[test]
    fn origin_is_null_island() {
        assert!(close(project(0.0, 0.0), NULL_ISLAND));
    }

    #[test]
    fn corners_reach_canvas_edges() {
        assert!(close(project(0.0, 180.0), (2000.0, 497.0)));
        assert!(close(project(0.0, -180.0), (0.0, 497.0)));
        assert!(close(project(90.0, 0.0), (986.0, 0.0)));
        assert!(close(project(-90.0, 0.0), (986.0, 857.0)));
    }

    #[test]
    fn interpolates_between_rows() {
        // Half-way between 0 and 5 degrees.
        let (_, y) = project(2.5, 0.0);
        assert!((y - (497.0 - 0.031 * 497.0)).abs() < 0.01);
    }

    #[test]
    fn beyond_pole_reuses_last_row() {
        assert!(close(project(95.0, 90.0), project(90.0, 90.0)));
    }

    #[test]
    fn parallels_shrink_toward_the_poles() {
        let (x_equator, _) = project(0.0, 90.0);
        let (x_high, _) = project(60.0, 90.0);
        assert!(x_high < x_equator);
        assert!(x_high > NULL_ISLAND.0);
    }

    #[test]
    fn north_is_up() {
        let (_, y_paris) = project(48.85, 2.35);
        let (_, y_sydney) = project(-33.87, 151.21);
        assert!(y_paris < NULL_ISLAND.1);
        assert!(y_sydney > NULL_ISLAND.1);
    }
}
