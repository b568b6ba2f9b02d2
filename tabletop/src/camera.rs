//! Pan/zoom camera and coordinate conversions.
//!
//! Pure affine transform between world and screen space, independent of any
//! game rule: `screen = world * zoom + pan`. Zoom is clamped to
//! [`MIN_ZOOM`]..=[`MAX_ZOOM`], and [`Camera::zoom_at`] re-derives the pan so
//! the world point under the cursor stays under the cursor — a correctness
//! property the tests pin down, not a heuristic.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM};
use crate::geometry::Point;

/// Camera state for pan/zoom over the map.
///
/// `pan_x` / `pan_y` are in screen pixels; `zoom` is a scale factor.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Additive pan update, in screen pixels. Used by drag- and key-panning.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Set the zoom, clamped, keeping the world point currently under
    /// `cursor` (screen space) under the cursor after rescaling.
    pub fn zoom_at(&mut self, cursor: Point, new_zoom: f64) {
        let anchor = self.screen_to_world(cursor);
        self.zoom = new_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan_x = cursor.x - anchor.x * self.zoom;
        self.pan_y = cursor.y - anchor.y * self.zoom;
    }
}
