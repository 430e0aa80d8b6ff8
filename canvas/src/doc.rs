//! Document model: the background and the placed emoji.
//!
//! `Document` is a plain value. It never starts work of its own; when the
//! background changes it only reports that fact through [`BackgroundChange`],
//! and the owner (the engine) decides what follows. Copy-on-write snapshots
//! come from holding the document in an `Arc` and mutating through
//! `Arc::make_mut`, so a reader that kept an older `Arc` never sees a change.
//!
//! Emoji ids are minted from a private counter that only moves forward.
//! Nothing removes emoji today, but ids would still never be reused if
//! something did.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::camera::{DocPoint, round_to_i32};
use crate::palette::is_single_glyph;

/// Unique identifier for an emoji within one document.
pub type EmojiId = u64;

/// The canvas backdrop. Exactly one variant is active.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Background {
    /// No image.
    #[default]
    Blank,
    /// An image to be fetched from this URL.
    RemoteUrl(String),
    /// Encoded image bytes supplied directly (e.g. a dropped image).
    InlineImage(Arc<[u8]>),
}

impl Background {
    /// The remote URL, when this is a [`Background::RemoteUrl`].
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::RemoteUrl(url) => Some(url),
            _ => None,
        }
    }

    /// The inline bytes, when this is a [`Background::InlineImage`].
    #[must_use]
    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Self::InlineImage(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn inline(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::InlineImage(bytes.into())
    }
}

// Inline images can be megabytes; print the length, not the payload.
impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("Blank"),
            Self::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
            Self::InlineImage(bytes) => write!(f, "InlineImage({} bytes)", bytes.len()),
        }
    }
}

/// Result of [`Document::set_background`]: whether the value actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundChange {
    Changed,
    Unchanged,
}

/// A placed emoji. Identity and glyph are fixed at creation; placement is not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emoji {
    id: EmojiId,
    text: String,
    x: i32,
    y: i32,
    size: i32,
}

impl Emoji {
    #[must_use]
    pub fn id(&self) -> EmojiId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[must_use]
    pub fn size(&self) -> i32 {
        self.size
    }

    #[must_use]
    pub fn position(&self) -> DocPoint {
        DocPoint { x: self.x, y: self.y }
    }
}

/// Precondition violations rejected by document mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocError {
    /// `add_emoji` was given something other than exactly one glyph.
    #[error("emoji text must be a single glyph, got {0:?}")]
    InvalidGlyph(String),
    /// `scale_emoji` was given a factor that is not finite and positive.
    #[error("scale factor must be finite and positive, got {0}")]
    InvalidScale(f64),
}

/// Background plus the ordered emoji collection for one editing session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    background: Background,
    emojis: Vec<Emoji>,
    #[serde(skip)]
    next_emoji_id: EmojiId,
}

impl Document {
    /// Create an empty document with a blank background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Emoji in insertion order (bottom of the z-order first).
    #[must_use]
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// Look up an emoji by id.
    #[must_use]
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id == id)
    }

    /// Position of an emoji in [`Document::emojis`].
    #[must_use]
    pub fn index_of(&self, id: EmojiId) -> Option<usize> {
        self.emojis.iter().position(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }

    /// Replace the background. Always succeeds.
    pub fn set_background(&mut self, background: Background) -> BackgroundChange {
        if self.background == background {
            return BackgroundChange::Unchanged;
        }
        self.background = background;
        BackgroundChange::Changed
    }

    /// Append a new emoji and return its freshly minted id.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidGlyph`] unless `text` is exactly one glyph.
    pub fn add_emoji(&mut self, text: &str, at: DocPoint, size: i32) -> Result<EmojiId, DocError> {
        if !is_single_glyph(text) {
            return Err(DocError::InvalidGlyph(text.to_owned()));
        }
        self.next_emoji_id += 1;
        let id = self.next_emoji_id;
        self.emojis.push(Emoji { id, text: text.to_owned(), x: at.x, y: at.y, size });
        Ok(id)
    }

    /// Offset an emoji by `(dx, dy)`. Returns false if no emoji has this id.
    pub fn move_emoji(&mut self, id: EmojiId, dx: i32, dy: i32) -> bool {
        let Some(emoji) = self.emojis.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        emoji.x = emoji.x.saturating_add(dx);
        emoji.y = emoji.y.saturating_add(dy);
        true
    }

    /// Multiply an emoji's size by `factor`, rounding half away from zero.
    ///
    /// Returns `Ok(false)` if no emoji has this id. Repeated scaling
    /// accumulates rounding error; that drift is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::InvalidScale`] if `factor` is not finite and positive.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) -> Result<bool, DocError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(DocError::InvalidScale(factor));
        }
        let Some(emoji) = self.emojis.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        emoji.size = round_to_i32(f64::from(emoji.size) * factor);
        Ok(true)
    }
}
