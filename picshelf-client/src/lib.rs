//! Picshelf client library
//!
//! Headless workflows for a picshelf image backend: an infinite-scroll
//! gallery with search, a validated single-file upload form, and full-size
//! preview with download. Front ends (the `picshelfctl` binary, or a UI)
//! forward user input into the [`app::App`] shell and read state back out.
//!
//! Notes
//! - Library code logs through the `log` facade; binaries pick the backend.
//! - [`infra::testing`] ships an in-memory [`infra::ApiService`] used by the
//!   crate's own tests and available to front-end tests.

pub mod app;
pub mod common;
pub mod config;
pub mod domains;
pub mod infra;

pub use app::App;
pub use config::{ClientConfig, ConfigLoadError, ConfigSource};
