//! Coordinate conversion between document space and screen space.
//!
//! Document space is integer-valued, unscaled, with its origin at the centre
//! of the canvas. Screen space is floating point and viewport-relative. The
//! two are related by the effective pan offset (screen pixels) and zoom scale:
//!
//! ```text
//! screen = viewport_center + doc * zoom + pan
//! doc    = round((screen - pan - viewport_center) / zoom)
//! ```
//!
//! Callers must never pass a zoom of zero; the gesture controller keeps the
//! effective zoom strictly positive.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point or offset in screen space (floating point pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The zero offset.
    #[must_use]
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y }
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self { x: self.x * factor, y: self.y * factor }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in document space. Origin is the canvas centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DocPoint {
    pub x: i32,
    pub y: i32,
}

impl DocPoint {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height, used for viewports and image natural sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Centre of a viewport of this size, in its own local coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: self.width * 0.5, y: self.height * 0.5 }
    }
}

/// Project a document point onto the screen.
#[must_use]
pub fn to_screen(doc: DocPoint, viewport_center: Point, pan: Point, zoom: f64) -> Point {
    Point {
        x: viewport_center.x + f64::from(doc.x) * zoom + pan.x,
        y: viewport_center.y + f64::from(doc.y) * zoom + pan.y,
    }
}

/// Map a screen point back to the nearest document point.
///
/// Rounds half away from zero and saturates at the `i32` range.
#[must_use]
pub fn to_doc(screen: Point, viewport_center: Point, pan: Point, zoom: f64) -> DocPoint {
    DocPoint {
        x: round_to_i32((screen.x - pan.x - viewport_center.x) / zoom),
        y: round_to_i32((screen.y - pan.y - viewport_center.y) / zoom),
    }
}

/// Round half away from zero into an `i32`, saturating. NaN maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}

/// Effective camera for one frame: pan offset in screen pixels and zoom scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
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
    #[must_use]
    pub fn pan(&self) -> Point {
        Point { x: self.pan_x, y: self.pan_y }
    }

    /// Convert a document point to screen coordinates for a viewport centred at `center`.
    #[must_use]
    pub fn doc_to_screen(&self, doc: DocPoint, center: Point) -> Point {
        to_screen(doc, center, self.pan(), self.zoom)
    }

    /// Convert a screen point to the nearest document point.
    #[must_use]
    pub fn screen_to_doc(&self, screen: Point, center: Point) -> DocPoint {
        to_doc(screen, center, self.pan(), self.zoom)
    }

    /// Convert a screen-space distance (pixels) to document units.
    #[must_use]
    pub fn screen_dist_to_doc(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }
}
