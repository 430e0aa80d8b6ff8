//! Background resolution state machine.
//!
//! Turns the document's [`Background`] into a decoded image. Inline images
//! decode immediately. Remote images need a fetch, which this module never
//! performs itself: it hands the host a [`FetchRequest`], and the host later
//! reports the decoded result back through [`BackgroundState::complete_fetch`].
//!
//! ```text
//!             background changed (any variant): image cleared
//!   Idle ───────────────────────────────────────────────────────▶ Idle
//!    │  RemoteUrl(u)                                               ▲
//!    ▼                                                             │
//!  Fetching ── complete_fetch(u) while background == RemoteUrl(u) ─┘
//! ```
//!
//! A completion whose URL no longer matches the current background is stale:
//! it is dropped and leaves the state exactly as the newer change left it.
//! Fetch and decode failures both resolve to "no image".

#[cfg(test)]
#[path = "background_test.rs"]
mod background_test;

use serde::Serialize;

use crate::camera::Size;
use crate::doc::Background;

/// Decodes encoded image bytes into an image handle.
///
/// Implementations must not panic; undecodable input maps to `None`.
pub trait ImageDecoder {
    type Image: Clone;

    fn decode(&self, bytes: &[u8]) -> Option<Self::Image>;

    /// Natural size of a decoded image, used by fit-to-view.
    fn natural_size(&self, image: &Self::Image) -> Size;
}

/// Whether a remote background is currently being fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching,
}

/// A fetch the host must perform off the owner thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub url: String,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result matched the current background and was published.
    Applied,
    /// The background moved on; the result was discarded.
    Stale,
}

/// Fetch status plus the resolved image for the current background.
#[derive(Debug, Clone)]
pub struct BackgroundState<I> {
    status: FetchStatus,
    image: Option<I>,
}

impl<I> Default for BackgroundState<I> {
    fn default() -> Self {
        Self { status: FetchStatus::Idle, image: None }
    }
}

impl<I: Clone> BackgroundState<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    #[must_use]
    pub fn image(&self) -> Option<&I> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.status == FetchStatus::Fetching
    }

    /// React to the document's background having changed to `background`.
    ///
    /// Returns the fetch the host must start, if any.
    pub fn on_background_changed<D>(&mut self, background: &Background, decoder: &D) -> Option<FetchRequest>
    where
        D: ImageDecoder<Image = I>,
    {
        self.image = None;
        self.status = FetchStatus::Idle;
        match background {
            Background::Blank => None,
            Background::InlineImage(bytes) => {
                self.image = decoder.decode(bytes);
                None
            }
            Background::RemoteUrl(url) => {
                self.status = FetchStatus::Fetching;
                Some(FetchRequest { url: url.clone() })
            }
        }
    }

    /// Deliver the result of `request`, already decoded off the owner
    /// thread. `image` is `None` if the fetch or the decode failed.
    ///
    /// `current` is the document's background at the moment of delivery. The
    /// comparison and the state update happen in one call, so a caller on the
    /// owner thread applies them atomically.
    pub fn complete_fetch(&mut self, request: &FetchRequest, image: Option<I>, current: &Background) -> FetchOutcome {
        if current.url() != Some(request.url.as_str()) {
            return FetchOutcome::Stale;
        }
        self.status = FetchStatus::Idle;
        self.image = image;
        FetchOutcome::Applied
    }
}
