//! Wall picking helpers using kurbo library

use kurbo::{Line as KLine, ParamCurveNearest, Point};
use shared::WallSegment;

/// Tolerance passed to kurbo's nearest-point search (exact for lines)
const NEAREST_ACCURACY: f64 = 1e-9;

/// Convert array to kurbo Point
pub fn to_point(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

/// The centerline of a wall as a kurbo line
pub fn wall_line(wall: &WallSegment) -> KLine {
    KLine::new(to_point(wall.start()), to_point(wall.end()))
}

/// Distance from `p` to the wall's centerline (distance to the point for
/// zero-length walls)
pub fn distance_to_wall(wall: &WallSegment, p: [f64; 2]) -> f64 {
    let line = wall_line(wall);
    if line.p0 == line.p1 {
        return line.p0.distance(to_point(p));
    }
    line.nearest(to_point(p), NEAREST_ACCURACY).distance_sq.sqrt()
}

/// Index of the wall whose rendered stroke covers `p`.
///
/// Strokes have round caps, so a wall covers every point within half its
/// thickness of the centerline. Later walls are drawn on top and win ties.
pub fn pick_wall(walls: &[WallSegment], p: [f64; 2], tolerance: f64) -> Option<usize> {
    walls
        .iter()
        .enumerate()
        .rev()
        .find(|(_, wall)| distance_to_wall(wall, p) <= wall.thickness / 2.0 + tolerance)
        .map(|(i, _)| i)
}
