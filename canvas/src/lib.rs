//! Document model and view engine for the emoji art canvas.
//!
//! This crate is synchronous and free of I/O. It owns what is on the canvas
//! (a background and placed emoji), the pan/zoom projection used to look at
//! it, and the state machine that turns a background reference into a decoded
//! image. Fetching remote images is left to the host, which receives
//! [`engine::Action::FetchBackground`] requests and reports results back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EngineCore`]: composes the pieces below behind intent methods |
//! | [`doc`] | Document, emoji and background value types |
//! | [`background`] | Fetch status, resolved image and the staleness guard |
//! | [`camera`] | Document/screen coordinate conversion |
//! | [`input`] | Steady and in-flight pan/zoom gesture state |
//! | [`palette`] | Emoji palette and glyph classification |
//! | [`consts`] | Shared numeric constants (default font size, zoom) |

pub mod background;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod input;
pub mod palette;
