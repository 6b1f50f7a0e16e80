//! Grid quantization shared by the sketch editor and unit conversion.

/// Size of one grid cell in canvas units. One cell is one foot.
pub const GRID_STEP: f64 = 20.0;

/// Snap a single coordinate to the nearest grid line
pub fn snap_value(v: f64) -> f64 {
    (v / GRID_STEP).round() * GRID_STEP
}

/// Snap a point to the nearest grid intersection
pub fn snap(x: f64, y: f64) -> (f64, f64) {
    (snap_value(x), snap_value(y))
}

/// True when `v` lies exactly on a grid line
pub fn is_on_grid(v: f64) -> bool {
    (v / GRID_STEP).fract() == 0.0
}

/// Convert a length in canvas units to the given display unit
pub fn to_display_units(length: f64, units: shared::Units) -> f64 {
    length / GRID_STEP * units.conversion_factor()
}

/// Background grid lines covering the rectangle at `min` of size `size`.
///
/// Lines stay on multiples of `GRID_STEP` so they meet the snap points.
/// Returns `[x1, y1, x2, y2]` per line: vertical lines first, then horizontal.
pub fn grid_lines(min: [f64; 2], size: [f64; 2]) -> Vec<[f64; 4]> {
    let max = [min[0] + size[0], min[1] + size[1]];
    let steps = |lo: f64, hi: f64| {
        let first = (lo / GRID_STEP).ceil() as i64;
        let last = (hi / GRID_STEP).floor() as i64;
        (first..=last).map(|i| i as f64 * GRID_STEP)
    };
    let mut lines: Vec<[f64; 4]> = steps(min[0], max[0]).map(|x| [x, min[1], x, max[1]]).collect();
    lines.extend(steps(min[1], max[1]).map(|y| [min[0], y, max[0], y]));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest() {
        assert_eq!(snap(9.9, 10.1), (0.0, 20.0));
        assert_eq!(snap(31.0, -29.0), (40.0, -20.0));
        assert_eq!(snap(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_snap_is_idempotent() {
        let samples = [-1234.5, -20.0, -9.99, 0.0, 0.5, 10.0, 19.999, 333.3, 98765.4];
        for &x in &samples {
            for &y in &samples {
                let once = snap(x, y);
                assert_eq!(snap(once.0, once.1), once);
                assert!(is_on_grid(once.0) && is_on_grid(once.1));
            }
        }
    }

    #[test]
    fn test_display_units() {
        assert_eq!(to_display_units(100.0, shared::Units::Feet), 5.0);
        assert!((to_display_units(100.0, shared::Units::Meters) - 1.524).abs() < 1e-12);
    }

    #[test]
    fn test_grid_lines_cover_canvas() {
        let lines = grid_lines([0.0, 0.0], [100.0, 40.0]);
        // 6 vertical (0..=5) + 3 horizontal (0..=2)
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[5], [100.0, 0.0, 100.0, 40.0]);
        assert_eq!(lines[8], [0.0, 40.0, 100.0, 40.0]);
    }

    #[test]
    fn test_grid_lines_stay_on_snap_points() {
        let lines = grid_lines([-50.0, 0.0], [100.0, 20.0]);
        // x = -40, -20, 0, 20, 40
        assert_eq!(lines.len(), 5 + 2);
        assert_eq!(lines[0], [-40.0, 0.0, -40.0, 20.0]);
        assert!(lines.iter().all(|l| is_on_grid(l[0]) || is_on_grid(l[1])));
    }
}
