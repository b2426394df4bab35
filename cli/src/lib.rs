//! Native client for the education admin API.
//!
//! [`http_backend::HttpBackend`] implements the shared
//! [`edu_admin_shared::CollectionBackend`] over `reqwest`, so the same
//! controllers that drive the browser pages can be scripted from a terminal.

pub mod config;
pub mod http_backend;

pub use config::{ClientConfig, FileSessionStore};
pub use http_backend::HttpBackend;
