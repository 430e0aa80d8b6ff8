//! Drop resolution: turns whatever the input layer dropped into one intent.
//!
//! Matchers run in priority order (URL, raw image, text glyph) over the whole
//! drop. The first matcher that recognises any item wins, so a drop carrying
//! both a link and a preview image sets the linked image as background.

use canvas::doc::Background;
use canvas::palette::{first_glyph, is_emoji};
use reqwest::Url;

/// Query parameter image-search result pages use to carry the real image URL.
const IMAGE_URL_QUERY_KEY: &str = "imgurl";

/// One representation offered by a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropItem {
    Url(String),
    Image(Vec<u8>),
    Text(String),
}

/// What a resolved drop asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropIntent {
    SetBackground(Background),
    /// Add this glyph at the drop point, sized for the current zoom.
    AddEmoji(String),
}

type Matcher = fn(&[DropItem]) -> Option<DropIntent>;

const MATCHERS: [Matcher; 3] = [match_url, match_image, match_text];

/// Resolve a drop. `None` means nothing in it was usable.
#[must_use]
pub fn resolve(items: &[DropItem]) -> Option<DropIntent> {
    MATCHERS.iter().find_map(|matcher| matcher(items))
}

fn match_url(items: &[DropItem]) -> Option<DropIntent> {
    items.iter().find_map(|item| match item {
        DropItem::Url(raw) => normalize_image_url(raw).map(|url| DropIntent::SetBackground(Background::RemoteUrl(url))),
        _ => None,
    })
}

fn match_image(items: &[DropItem]) -> Option<DropIntent> {
    items.iter().find_map(|item| match item {
        DropItem::Image(bytes) if !bytes.is_empty() => {
            Some(DropIntent::SetBackground(Background::inline(bytes.clone())))
        }
        _ => None,
    })
}

fn match_text(items: &[DropItem]) -> Option<DropIntent> {
    items.iter().find_map(|item| match item {
        DropItem::Text(text) => first_glyph(text.trim_start())
            .filter(|glyph| is_emoji(glyph))
            .map(|glyph| DropIntent::AddEmoji(glyph.to_owned())),
        _ => None,
    })
}

/// Parse a dropped URL, unwrapping image-search links to the image itself.
///
/// Returns `None` if `raw` is not an absolute URL.
#[must_use]
pub fn normalize_image_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let embedded = url
        .query_pairs()
        .find(|(key, _)| key == IMAGE_URL_QUERY_KEY)
        .and_then(|(_, value)| Url::parse(&value).ok());
    Some(embedded.unwrap_or(url).into())
}

#[cfg(test)]
#[path = "drop_test.rs"]
mod tests;
