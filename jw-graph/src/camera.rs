//! Focus camera for the graph view.

use crate::layout::Point;

/// Zoom applied when the operator focuses a node.
pub const FOCUS_ZOOM: f64 = 4.0;

/// World-to-viewport transform: a center in layout space plus a zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Point,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            center: Point { x: 0.0, y: 0.0 },
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-center on a node's current position and zoom in on it.
    pub fn focus_on(&mut self, position: Point) {
        self.center = position;
        self.zoom = FOCUS_ZOOM;
    }

    /// Back to the whole-graph view.
    pub fn reset(&mut self) {
        *self = Camera::default();
    }

    /// Map a layout-space point into viewport coordinates with the viewport
    /// center as the camera center.
    pub fn project(&self, world: Point, viewport_w: f64, viewport_h: f64) -> (f64, f64) {
        (
            (world.x - self.center.x) * self.zoom + viewport_w / 2.0,
            (world.y - self.center.y) * self.zoom + viewport_h / 2.0,
        )
    }
}
