//! Tile server access
//!
//! This module provides the HTTP transport abstraction and the URL
//! templating used to address individual tiles on a map server.
//!
//! # Example
//!
//! ```ignore
//! use bluestitch::provider::{HttpClient, ReqwestClient, TileSource};
//! use bluestitch::coord::TileCoord;
//!
//! let client = ReqwestClient::new()?;
//! let source = TileSource::new("http://localhost:8100/", "maps/{world}/tiles/1/x{x}/z{z}.png", "overworld");
//! let bytes = client.get(&source.build_url(TileCoord::new(0, 0))?)?;
//! ```

mod http;
mod source;
mod types;

pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use source::{TileSource, DEFAULT_TILE_PATH, DEFAULT_WORLD};
pub use types::ProviderError;

#[cfg(test)]
pub use http::tests::{MockHttpClient, RoutingMockClient};
