//! Async host for the emoji art canvas.
//!
//! [`canvas`] holds the synchronous document and view engine. This crate runs
//! it behind a single-writer tokio actor ([`session`]), fetches remote
//! backgrounds ([`fetch`]), decodes them ([`decode`]), resolves drops
//! ([`drop`]) and speaks a JSON-lines protocol for the headless binary
//! ([`host`]). Configuration comes from the environment ([`config`]).

pub mod config;
pub mod decode;
pub mod drop;
pub mod fetch;
pub mod host;
pub mod session;
