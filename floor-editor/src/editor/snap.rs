//! Wall drawing helpers

use shared::layout::Point;
use shared::models::Line;

/// Distance within which a wall end snaps onto an existing end
pub const SNAP_THRESHOLD: f64 = 15.0;

/// Walls shorter than this are discarded
pub const MIN_LINE_LENGTH: f64 = 10.0;

/// The existing line endpoint closest to `point`, if closer than `threshold`
pub fn find_nearest_endpoint(point: Point, lines: &[Line], threshold: f64) -> Option<Point> {
    lines
        .iter()
        .flat_map(|line| line.endpoints())
        .map(|end| (end.distance(&point), end))
        .filter(|(distance, _)| *distance < threshold)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, end)| end)
}

/// Snap `point` to a nearby endpoint, or keep it
pub fn snap(point: Point, lines: &[Line]) -> Point {
    find_nearest_endpoint(point, lines, SNAP_THRESHOLD).unwrap_or(point)
}
