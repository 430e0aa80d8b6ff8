//! Shared numeric constants for the canvas crate.

// ── Emoji ───────────────────────────────────────────────────────

/// Font size, in screen points, of an emoji dropped from the palette at zoom 1.
pub const DEFAULT_EMOJI_FONT_SIZE: f64 = 40.0;

/// Smallest size an emoji can be created with.
pub const MIN_EMOJI_SIZE: i32 = 1;

/// Glyphs offered by the default palette, in display order.
pub const DEFAULT_PALETTE: &str = "😏🚒⚠️🎳🏄‍♂️🥌🦜🏎😭🎲🚁🖐🏻😜🥺🎯🦁🦀🐔🍑🛼🥊";

// ── View ────────────────────────────────────────────────────────

/// Zoom scale of a freshly opened canvas.
pub const DEFAULT_ZOOM: f64 = 1.0;
