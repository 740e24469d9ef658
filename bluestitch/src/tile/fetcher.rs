//! Tile fetching: address, download and decode one tile.

use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use super::raw::RawTile;
use crate::coord::TileCoord;
use crate::provider::{HttpClient, ProviderError, TileSource};

/// A tile that could not be fetched.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to fetch tile {coord}: {source}")]
pub struct FetchError {
    /// The tile that failed
    pub coord: TileCoord,
    /// Transport or decode cause
    #[source]
    pub source: ProviderError,
}

/// Trait for tile fetching strategies.
///
/// Implementations must be thread-safe (`Send + Sync`) since the pipeline
/// fetches tiles from several worker threads at once.
pub trait TileFetcher: Send + Sync {
    /// Fetches and fully decodes one tile.
    fn fetch(&self, coord: TileCoord, source: &TileSource) -> Result<RawTile, FetchError>;
}

/// Fetches tiles over HTTP through an injected [`HttpClient`].
pub struct HttpTileFetcher<C: HttpClient> {
    http_client: C,
}

impl<C: HttpClient> HttpTileFetcher<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }
}

impl<C: HttpClient> TileFetcher for HttpTileFetcher<C> {
    fn fetch(&self, coord: TileCoord, source: &TileSource) -> Result<RawTile, FetchError> {
        let wrap = |source| FetchError { coord, source };

        let url = source.build_url(coord).map_err(wrap)?;
        debug!(x = coord.x, z = coord.z, url = %url, "Fetching tile");

        let start = Instant::now();
        let bytes = self.http_client.get(&url).map_err(wrap)?;
        let tile = RawTile::decode(&bytes).map_err(wrap)?;

        debug!(
            x = coord.x,
            z = coord.z,
            bytes = bytes.len(),
            width = tile.width(),
            height = tile.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched tile"
        );

        Ok(tile)
    }
}
