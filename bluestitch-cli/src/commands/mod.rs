//! CLI command implementations.
//!
//! - [`config`] - Configuration management (init, show, path)
//! - [`locate`] - Block position to tile conversion
//! - [`render`] - Fetch, blend and stitch a tile range

pub mod common;
pub mod config;
pub mod locate;
pub mod render;
