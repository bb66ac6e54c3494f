//! Edge-label placement geometry.

use std::f64::consts::PI;

use crate::layout::Point;

/// Where to draw an edge's relation text: the edge midpoint, with a rotation
/// that keeps the text upright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    pub x: f64,
    pub y: f64,
    /// Rotation in radians, always within [-PI/2, PI/2].
    pub angle: f64,
}

/// Compute the placement for an edge from `start` to `end`.
///
/// Returns `None` for a zero-length edge, which has no direction to align
/// with. Callers skip the label entirely when either endpoint has no
/// position yet.
pub fn label_placement(start: Point, end: Point) -> Option<LabelPlacement> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let mut angle = dy.atan2(dx);
    // Reflect angles pointing leftward so the text never renders upside
    // down, same as flipping the reading direction of the edge.
    if angle > PI / 2.0 {
        angle -= PI;
    }
    if angle < -PI / 2.0 {
        angle += PI;
    }
    Some(LabelPlacement {
        x: start.x + dx / 2.0,
        y: start.y + dy / 2.0,
        angle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn label_sits_at_the_midpoint() {
        let placement = label_placement(point(0.0, 0.0), point(10.0, 4.0)).unwrap();
        assert_eq!(placement.x, 5.0);
        assert_eq!(placement.y, 2.0);
    }

    #[test]
    fn rightward_edges_keep_their_angle() {
        let placement = label_placement(point(0.0, 0.0), point(10.0, 10.0)).unwrap();
        assert!((placement.angle - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn leftward_edges_are_reflected_upright() {
        // atan2 gives 3*PI/4 here; reflected down into the upright range.
        let placement = label_placement(point(0.0, 0.0), point(-10.0, 10.0)).unwrap();
        assert!((placement.angle + PI / 4.0).abs() < 1e-12);

        // And the mirror case below the axis.
        let placement = label_placement(point(0.0, 0.0), point(-10.0, -10.0)).unwrap();
        assert!((placement.angle - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn pure_leftward_edge_reads_as_rightward() {
        let placement = label_placement(point(5.0, 0.0), point(-5.0, 0.0)).unwrap();
        assert_eq!(placement.angle, 0.0);
    }

    #[test]
    fn vertical_edges_stay_at_the_boundary() {
        let up = label_placement(point(0.0, 0.0), point(0.0, 10.0)).unwrap();
        assert!((up.angle - PI / 2.0).abs() < 1e-12);
        let down = label_placement(point(0.0, 0.0), point(0.0, -10.0)).unwrap();
        assert!((down.angle + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_length_edge_has_no_label() {
        assert_eq!(label_placement(point(3.0, 3.0), point(3.0, 3.0)), None);
    }

    #[test]
    fn reflected_angles_always_land_upright() {
        for i in 0..64 {
            let theta = (i as f64 / 64.0) * std::f64::consts::TAU;
            let end = point(theta.cos() * 20.0, theta.sin() * 20.0);
            if let Some(p) = label_placement(point(0.0, 0.0), end) {
                assert!(
                    p.angle >= -PI / 2.0 - 1e-12 && p.angle <= PI / 2.0 + 1e-12,
                    "angle {} out of upright range for theta {}",
                    p.angle,
                    theta
                );
            }
        }
    }
}
