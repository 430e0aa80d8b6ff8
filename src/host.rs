//! JSON-lines protocol spoken by the headless binary.
//!
//! Each input line is one [`HostCommand`] tagged by `op`. Commands that
//! produce output (`add`, `snapshot`, `palette`) return a JSON value; the
//! rest are fire-and-forget intents.

use std::path::PathBuf;

use canvas::background::FetchStatus;
use canvas::camera::{Camera, DocPoint, Point, Size};
use canvas::consts::DEFAULT_EMOJI_FONT_SIZE;
use canvas::doc::{Background, EmojiId};
use canvas::palette::Palette;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::drop::DropItem;
use crate::session::{Command, SessionError, SessionHandle, SessionSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid command: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    /// A drop at a screen point carrying any mix of url, image file and text.
    Drop {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        image_path: Option<PathBuf>,
        #[serde(default)]
        text: Option<String>,
        x: f64,
        y: f64,
    },
    /// Set a remote background, or clear it when `url` is absent.
    Background {
        #[serde(default)]
        url: Option<String>,
    },
    Add {
        text: String,
        x: i32,
        y: i32,
        #[serde(default = "default_emoji_size")]
        size: i32,
    },
    Move {
        id: EmojiId,
        dx: i32,
        dy: i32,
    },
    Scale {
        id: EmojiId,
        factor: f64,
    },
    /// A completed pan gesture, in screen pixels.
    Pan {
        dx: f64,
        dy: f64,
    },
    /// A completed pinch gesture.
    Zoom {
        scale: f64,
    },
    ZoomToFit,
    Viewport {
        width: f64,
        height: f64,
    },
    Snapshot,
    Palette,
}

#[allow(clippy::cast_possible_truncation)]
fn default_emoji_size() -> i32 {
    DEFAULT_EMOJI_FONT_SIZE as i32
}

impl HostCommand {
    /// # Errors
    ///
    /// Returns [`HostError::Parse`] if `line` is not a known command.
    pub fn parse(line: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Run one command against a session.
///
/// # Errors
///
/// Returns [`HostError::Io`] if a dropped image file cannot be read and
/// [`HostError::Session`] if the session rejects or has stopped.
pub async fn execute<I: Clone>(handle: &SessionHandle<I>, command: HostCommand) -> Result<Option<Value>, HostError> {
    match command {
        HostCommand::Drop { url, image_path, text, x, y } => {
            let mut items = Vec::new();
            if let Some(url) = url {
                items.push(DropItem::Url(url));
            }
            if let Some(path) = image_path {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| HostError::Io { path: path.clone(), message: e.to_string() })?;
                items.push(DropItem::Image(bytes));
            }
            if let Some(text) = text {
                items.push(DropItem::Text(text));
            }
            handle.drop_items(items, Point::new(x, y)).await?;
            Ok(None)
        }
        HostCommand::Background { url } => {
            let background = url.map_or(Background::Blank, Background::RemoteUrl);
            handle.set_background(background).await?;
            Ok(None)
        }
        HostCommand::Add { text, x, y, size } => {
            let id = handle.add_emoji(&text, DocPoint::new(x, y), size).await?;
            Ok(Some(json!({ "id": id })))
        }
        HostCommand::Move { id, dx, dy } => {
            handle.move_emoji(id, dx, dy).await?;
            Ok(None)
        }
        HostCommand::Scale { id, factor } => {
            handle.scale_emoji(id, factor).await?;
            Ok(None)
        }
        HostCommand::Pan { dx, dy } => {
            handle.send(Command::PanEnded(Point::new(dx, dy))).await?;
            Ok(None)
        }
        HostCommand::Zoom { scale } => {
            handle.send(Command::ZoomEnded(scale)).await?;
            Ok(None)
        }
        HostCommand::ZoomToFit => {
            handle.zoom_to_fit().await?;
            Ok(None)
        }
        HostCommand::Viewport { width, height } => {
            handle.send(Command::SetViewport(Size::new(width, height))).await?;
            Ok(None)
        }
        HostCommand::Snapshot => {
            let snapshot = handle.sync().await?;
            Ok(Some(serde_json::to_value(SnapshotSummary::from_snapshot(&snapshot))?))
        }
        HostCommand::Palette => {
            let palette = Palette::default();
            Ok(Some(json!({ "palette": palette.glyphs() })))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackgroundSummary {
    Blank,
    RemoteUrl { url: String },
    InlineImage { bytes: usize },
}

impl From<&Background> for BackgroundSummary {
    fn from(background: &Background) -> Self {
        match background {
            Background::Blank => Self::Blank,
            Background::RemoteUrl(url) => Self::RemoteUrl { url: url.clone() },
            Background::InlineImage(bytes) => Self::InlineImage { bytes: bytes.len() },
        }
    }
}

/// An emoji as stored plus where a renderer would draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmojiSummary {
    pub id: EmojiId,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub screen: Point,
    pub font_size: f64,
}

/// Renderer-facing view of a snapshot. Inline image bytes are elided.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub version: u64,
    pub status: FetchStatus,
    pub background: BackgroundSummary,
    pub image: Option<Size>,
    pub camera: Camera,
    pub viewport: Size,
    pub emojis: Vec<EmojiSummary>,
}

impl SnapshotSummary {
    #[must_use]
    pub fn from_snapshot<I>(snapshot: &SessionSnapshot<I>) -> Self {
        let center = snapshot.viewport.center();
        let emojis = snapshot
            .document
            .emojis()
            .iter()
            .map(|e| EmojiSummary {
                id: e.id(),
                text: e.text().to_owned(),
                x: e.x(),
                y: e.y(),
                size: e.size(),
                screen: snapshot.camera.doc_to_screen(e.position(), center),
                font_size: f64::from(e.size()) * snapshot.camera.zoom,
            })
            .collect();
        Self {
            version: snapshot.version,
            status: snapshot.status,
            background: snapshot.document.background().into(),
            image: snapshot.image_size,
            camera: snapshot.camera,
            viewport: snapshot.viewport,
            emojis,
        }
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
