use std::sync::Arc;

use crate::background::{BackgroundState, FetchOutcome, FetchRequest, FetchStatus, ImageDecoder};
use crate::camera::{Camera, DocPoint, Point, Size};
use crate::consts::{DEFAULT_EMOJI_FONT_SIZE, MIN_EMOJI_SIZE};
use crate::doc::{Background, BackgroundChange, DocError, Document, EmojiId};
use crate::input::GestureController;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from intent handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start this fetch off the owner thread and report back via
    /// [`EngineCore::complete_fetch`].
    FetchBackground(FetchRequest),
    /// Visible state changed; the renderer should re-read.
    RenderNeeded,
}

/// Owner of one editing session's document, view and background state.
///
/// Every method runs on the caller's thread and never blocks, so a host that
/// funnels all calls through one task gets the single-writer discipline for
/// free. The document is held behind an `Arc`: [`EngineCore::snapshot`] hands
/// out cheap read-only copies, and mutations go through `Arc::make_mut`.
pub struct EngineCore<D: ImageDecoder> {
    doc: Arc<Document>,
    view: GestureController,
    background: BackgroundState<D::Image>,
    decoder: D,
    viewport: Size,
}

impl<D: ImageDecoder> EngineCore<D> {
    #[must_use]
    pub fn new(decoder: D, viewport: Size) -> Self {
        Self {
            doc: Arc::new(Document::new()),
            view: GestureController::new(),
            background: BackgroundState::new(),
            decoder,
            viewport,
        }
    }

    // --- Document intents ---

    /// Replace the background and drive background resolution if it changed.
    pub fn set_background(&mut self, background: Background) -> Vec<Action> {
        if self.doc.background() == &background {
            return Vec::new();
        }
        if Arc::make_mut(&mut self.doc).set_background(background) == BackgroundChange::Unchanged {
            return Vec::new();
        }
        let mut actions = Vec::with_capacity(2);
        if let Some(request) = self.background.on_background_changed(self.doc.background(), &self.decoder) {
            actions.push(Action::FetchBackground(request));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Add an emoji at a document point.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidGlyph`] unless `text` is a single glyph.
    pub fn add_emoji(&mut self, text: &str, at: DocPoint, size: i32) -> Result<EmojiId, DocError> {
        Arc::make_mut(&mut self.doc).add_emoji(text, at, size)
    }

    /// Add an emoji dropped at a screen point, sized for the current zoom.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidGlyph`] unless `text` is a single glyph.
    pub fn drop_emoji(&mut self, text: &str, screen: Point) -> Result<EmojiId, DocError> {
        let at = self.screen_to_doc(screen);
        let size = self.drop_emoji_size();
        self.add_emoji(text, at, size)
    }

    /// Move an emoji. Returns false (and leaves the snapshot untouched) if absent.
    pub fn move_emoji(&mut self, id: EmojiId, dx: i32, dy: i32) -> bool {
        if self.doc.emoji(id).is_none() {
            return false;
        }
        Arc::make_mut(&mut self.doc).move_emoji(id, dx, dy)
    }

    /// Scale an emoji. Returns `Ok(false)` (and leaves the snapshot untouched) if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidScale`] if `factor` is not finite and positive.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) -> Result<bool, DocError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(DocError::InvalidScale(factor));
        }
        if self.doc.emoji(id).is_none() {
            return Ok(false);
        }
        Arc::make_mut(&mut self.doc).scale_emoji(id, factor)
    }

    // --- Background resolution ---

    /// Deliver a finished fetch. `image` is `None` when the fetch or decode failed.
    pub fn complete_fetch(&mut self, request: &FetchRequest, image: Option<D::Image>) -> FetchOutcome {
        self.background.complete_fetch(request, image, self.doc.background())
    }

    // --- View intents ---

    /// Replace the viewport size. Ignored unless both dimensions are finite
    /// and positive. Returns whether the viewport changed.
    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        if !viewport.is_positive() || viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    pub fn pan_changed(&mut self, translation: Point) -> bool {
        self.view.pan_changed(translation)
    }

    pub fn pan_ended(&mut self, translation: Point) -> bool {
        self.view.pan_ended(translation)
    }

    pub fn zoom_changed(&mut self, scale: f64) -> bool {
        self.view.zoom_changed(scale)
    }

    pub fn zoom_ended(&mut self, scale: f64) -> bool {
        self.view.zoom_ended(scale)
    }

    pub fn cancel_gesture(&mut self) -> bool {
        self.view.cancel_gesture()
    }

    pub fn on_pointer_down(&mut self, screen: Point) {
        self.view.pointer_down(screen);
    }

    pub fn on_pointer_move(&mut self, screen: Point) -> Vec<Action> {
        if self.view.pointer_move(screen) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    pub fn on_pointer_up(&mut self, screen: Point) -> Vec<Action> {
        if self.view.pointer_up(screen) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Fit the resolved background image into the viewport (double-tap).
    pub fn zoom_to_fit(&mut self) -> Vec<Action> {
        let image = self.background_image_size();
        if self.view.zoom_to_fit(image, self.viewport) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// A read-only snapshot that later mutations will not affect.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.doc)
    }

    #[must_use]
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    #[must_use]
    pub fn view(&self) -> &GestureController {
        &self.view
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.view.camera()
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn fetch_status(&self) -> FetchStatus {
        self.background.status()
    }

    /// True while a remote background is loading; renderers show a progress
    /// indicator instead of the emoji during this time.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.background.is_fetching()
    }

    #[must_use]
    pub fn background_image(&self) -> Option<&D::Image> {
        self.background.image()
    }

    #[must_use]
    pub fn background_image_size(&self) -> Option<Size> {
        self.background.image().map(|image| self.decoder.natural_size(image))
    }

    #[must_use]
    pub fn screen_to_doc(&self, screen: Point) -> DocPoint {
        self.camera().screen_to_doc(screen, self.viewport.center())
    }

    #[must_use]
    pub fn doc_to_screen(&self, doc: DocPoint) -> Point {
        self.camera().doc_to_screen(doc, self.viewport.center())
    }

    /// Where an emoji should be drawn on screen.
    #[must_use]
    pub fn emoji_screen_position(&self, id: EmojiId) -> Option<Point> {
        self.doc.emoji(id).map(|e| self.doc_to_screen(e.position()))
    }

    /// The font size an emoji should be drawn at on screen.
    #[must_use]
    pub fn emoji_font_size(&self, id: EmojiId) -> Option<f64> {
        self.doc
            .emoji(id)
            .map(|e| f64::from(e.size()) * self.view.zoom())
    }

    /// Document size for a newly dropped emoji, so it appears at the default
    /// font size whatever the current zoom. Truncates, never below the minimum.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn drop_emoji_size(&self) -> i32 {
        let size = (DEFAULT_EMOJI_FONT_SIZE / self.view.zoom()) as i32;
        size.max(MIN_EMOJI_SIZE)
    }
}
