//! Gesture controller: transient pan/zoom view state.
//!
//! Each of pan and zoom is kept as a committed "steady" value plus an
//! in-flight gesture delta. While a gesture runs only the delta changes; on
//! release it is folded into the steady value and reset to identity (zero
//! offset, scale 1). None of this touches the document. It only shapes the
//! projection used to draw and to map drop points back into document space.
//!
//! Pan values are stored in document units. A screen translation is divided
//! by the effective zoom on the way in, and the effective pan is scaled back
//! up by the effective zoom on the way out, so a pan stays anchored to the
//! same document content while the zoom changes.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{Camera, Point, Size};
use crate::consts::DEFAULT_ZOOM;

/// Pointer gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The user is dragging the canvas.
    Panning {
        /// Screen position where the drag started; translations are measured from here.
        start_screen: Point,
    },
}

/// Steady and in-flight pan/zoom for one canvas view.
#[derive(Debug, Clone)]
pub struct GestureController {
    steady_pan: Point,
    gesture_pan: Point,
    steady_zoom: f64,
    gesture_zoom: f64,
    input: InputState,
}

impl Default for GestureController {
    fn default() -> Self {
        Self {
            steady_pan: Point::zero(),
            gesture_pan: Point::zero(),
            steady_zoom: DEFAULT_ZOOM,
            gesture_zoom: 1.0,
            input: InputState::Idle,
        }
    }
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    /// Committed pan, in document units.
    #[must_use]
    pub fn steady_pan(&self) -> Point {
        self.steady_pan
    }

    /// In-flight pan delta, in document units.
    #[must_use]
    pub fn gesture_pan(&self) -> Point {
        self.gesture_pan
    }

    #[must_use]
    pub fn steady_zoom(&self) -> f64 {
        self.steady_zoom
    }

    #[must_use]
    pub fn gesture_zoom(&self) -> f64 {
        self.gesture_zoom
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.input
    }

    /// Effective zoom: steady times in-flight.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.steady_zoom * self.gesture_zoom
    }

    /// Effective pan in screen pixels.
    #[must_use]
    pub fn pan(&self) -> Point {
        self.steady_pan.add(self.gesture_pan).scale(self.zoom())
    }

    /// The effective camera for the current frame.
    #[must_use]
    pub fn camera(&self) -> Camera {
        let pan = self.pan();
        Camera { pan_x: pan.x, pan_y: pan.y, zoom: self.zoom() }
    }

    // --- Pan gesture ---
    //
    // Every gesture update returns whether the view changed. Inputs that
    // would leave the view non-finite are ignored.

    /// Update the in-flight pan from the total screen translation so far.
    pub fn pan_changed(&mut self, translation: Point) -> bool {
        let gesture = translation.scale(1.0 / self.zoom());
        if !gesture.is_finite() || gesture == self.gesture_pan {
            return false;
        }
        self.gesture_pan = gesture;
        true
    }

    /// Commit the final screen translation and reset the in-flight pan.
    pub fn pan_ended(&mut self, translation: Point) -> bool {
        let before = (self.steady_pan, self.gesture_pan);
        let steady = self.steady_pan.add(translation.scale(1.0 / self.zoom()));
        if steady.is_finite() {
            self.steady_pan = steady;
        }
        self.gesture_pan = Point::zero();
        (self.steady_pan, self.gesture_pan) != before
    }

    // --- Zoom gesture ---

    /// Update the in-flight zoom. Ignored unless both `scale` and the
    /// resulting effective zoom are finite and positive.
    #[allow(clippy::float_cmp)]
    pub fn zoom_changed(&mut self, scale: f64) -> bool {
        if !is_valid_scale(scale) || !is_valid_scale(self.steady_zoom * scale) {
            return false;
        }
        if self.gesture_zoom == scale {
            return false;
        }
        self.gesture_zoom = scale;
        true
    }

    /// Commit the final zoom scale and reset the in-flight zoom to 1.
    ///
    /// The steady zoom only moves when the product stays finite and positive;
    /// the in-flight zoom is reset either way.
    #[allow(clippy::float_cmp)]
    pub fn zoom_ended(&mut self, scale: f64) -> bool {
        let before = (self.steady_zoom, self.gesture_zoom);
        let steady = self.steady_zoom * scale;
        if is_valid_scale(scale) && is_valid_scale(steady) {
            self.steady_zoom = steady;
        }
        self.gesture_zoom = 1.0;
        self.steady_zoom != before.0 || self.gesture_zoom != before.1
    }

    /// Drop any in-flight deltas without committing them.
    #[allow(clippy::float_cmp)]
    pub fn cancel_gesture(&mut self) -> bool {
        let changed = self.gesture_pan != Point::zero()
            || self.gesture_zoom != 1.0
            || self.input != InputState::Idle;
        self.gesture_pan = Point::zero();
        self.gesture_zoom = 1.0;
        self.input = InputState::Idle;
        changed
    }

    // --- Pointer drag ---

    /// Begin a pan drag at `screen`.
    pub fn pointer_down(&mut self, screen: Point) {
        self.input = InputState::Panning { start_screen: screen };
    }

    /// Continue a pan drag. Returns false if no drag is in progress or the
    /// view did not move.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let InputState::Panning { start_screen } = self.input else {
            return false;
        };
        self.pan_changed(translation(start_screen, screen))
    }

    /// Finish a pan drag. Returns false if no drag is in progress.
    pub fn pointer_up(&mut self, screen: Point) -> bool {
        let InputState::Panning { start_screen } = self.input else {
            return false;
        };
        self.pan_ended(translation(start_screen, screen));
        self.input = InputState::Idle;
        true
    }

    // --- Fit ---

    /// Zoom so that an image of `image` size fits inside `viewport`, and recentre.
    ///
    /// No-op when the image is absent or either size has a non-positive
    /// dimension. Returns whether the view changed.
    pub fn zoom_to_fit(&mut self, image: Option<Size>, viewport: Size) -> bool {
        let Some(image) = image else {
            return false;
        };
        if !image.is_positive() || !viewport.is_positive() {
            return false;
        }
        let zoom = (viewport.width / image.width).min(viewport.height / image.height);
        if !is_valid_scale(zoom) {
            return false;
        }
        self.steady_pan = Point::zero();
        self.steady_zoom = zoom;
        true
    }
}

fn translation(from: Point, to: Point) -> Point {
    Point { x: to.x - from.x, y: to.y - from.y }
}

fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}
