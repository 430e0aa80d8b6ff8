//! Emoji palette and glyph classification.
//!
//! A palette is a plain string of emoji. It is split into user-perceived
//! characters (extended grapheme clusters) so that multi-scalar emoji such
//! as skin-tone modified hands or ZWJ sequences stay whole.

#[cfg(test)]
#[path = "palette_test.rs"]
mod palette_test;

use unicode_segmentation::UnicodeSegmentation;

use crate::consts::DEFAULT_PALETTE;

/// An ordered set of glyphs the user can drag onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE)
    }
}

impl Palette {
    #[must_use]
    pub fn new(glyphs: &str) -> Self {
        Self { glyphs: glyphs.to_owned() }
    }

    /// Each glyph as its own string slice, in palette order.
    #[must_use]
    pub fn glyphs(&self) -> Vec<&str> {
        self.glyphs.graphemes(true).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.graphemes(true).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The first user-perceived character of `text`, if any.
#[must_use]
pub fn first_glyph(text: &str) -> Option<&str> {
    text.graphemes(true).next()
}

/// True when `text` is exactly one non-empty grapheme cluster.
#[must_use]
pub fn is_single_glyph(text: &str) -> bool {
    let mut graphemes = text.graphemes(true);
    graphemes.next().is_some() && graphemes.next().is_none()
}

/// True when `glyph` renders as an emoji.
///
/// A single scalar counts when it is in the supplementary pictographic
/// blocks, or is one of the BMP characters that default to emoji
/// presentation. Other BMP symbols (dingbats, arrows, `#`, digits) only
/// count when a variation selector, keycap, or ZWJ follows them.
#[must_use]
pub fn is_emoji(glyph: &str) -> bool {
    let mut chars = glyph.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if is_emoji_presentation(first) {
        return true;
    }
    chars.any(|c| matches!(c, '\u{FE0F}' | '\u{20E3}' | '\u{200D}'))
}

fn is_emoji_presentation(c: char) -> bool {
    matches!(
        u32::from(c),
        0x231A | 0x231B
            | 0x23E9..=0x23EC
            | 0x23F0 | 0x23F3
            | 0x25FD | 0x25FE
            | 0x2614 | 0x2615
            | 0x2648..=0x2653
            | 0x267F | 0x2693 | 0x26A1
            | 0x26AA | 0x26AB
            | 0x26BD | 0x26BE
            | 0x26C4 | 0x26C5
            | 0x26CE | 0x26D4 | 0x26EA
            | 0x26F2 | 0x26F3 | 0x26F5 | 0x26FA | 0x26FD
            | 0x2705 | 0x270A | 0x270B | 0x2728
            | 0x274C | 0x274E
            | 0x2753..=0x2755
            | 0x2757
            | 0x2795..=0x2797
            | 0x27B0 | 0x27BF
            | 0x2B1B | 0x2B1C | 0x2B50 | 0x2B55
            | 0x1F000..=0x1FAFF
    )
}
