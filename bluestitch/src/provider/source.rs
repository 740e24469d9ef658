//! Tile server address and URL templating.

use reqwest::Url;

use super::types::ProviderError;
use crate::coord::TileCoord;

/// Default tile path template relative to the map address.
pub const DEFAULT_TILE_PATH: &str = "maps/{world}/tiles/1/x{x}/z{z}.png";

/// Default world name substituted for `{world}`.
pub const DEFAULT_WORLD: &str = "overworld";

/// Location of a tiled map on a tile server.
///
/// The tile path is a template containing `{x}`, `{z}` and `{world}`
/// placeholders. After substitution it is resolved against the base
/// address with standard relative-URL rules, so a base address without a
/// trailing slash has its last path segment replaced.
///
/// # Example
///
/// ```
/// use bluestitch::coord::TileCoord;
/// use bluestitch::provider::TileSource;
///
/// let source = TileSource::new("https://map.example.com/", "maps/{world}/x{x}/z{z}.png", "nether");
/// let url = source.build_url(TileCoord::new(-1, 2)).unwrap();
/// assert_eq!(url, "https://map.example.com/maps/nether/x-1/z2.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    /// Base address of the map server
    pub base_url: String,
    /// Tile path template
    pub tile_path: String,
    /// World name
    pub world: String,
}

impl TileSource {
    /// Creates a tile source.
    pub fn new(
        base_url: impl Into<String>,
        tile_path: impl Into<String>,
        world: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            tile_path: tile_path.into(),
            world: world.into(),
        }
    }

    /// Creates a tile source using the default tile path and world.
    pub fn with_defaults(base_url: impl Into<String>) -> Self {
        Self::new(base_url, DEFAULT_TILE_PATH, DEFAULT_WORLD)
    }

    /// Substitutes the placeholders of the tile path for one tile.
    pub fn tile_path_for(&self, coord: TileCoord) -> String {
        self.tile_path
            .replace("{x}", &coord.x.to_string())
            .replace("{z}", &coord.z.to_string())
            .replace("{world}", &self.world)
    }

    /// Builds the absolute URL of one tile.
    pub fn build_url(&self, coord: TileCoord) -> Result<String, ProviderError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("'{}': {}", self.base_url, e)))?;
        let path = self.tile_path_for(coord);
        let url = base
            .join(&path)
            .map_err(|e| ProviderError::InvalidUrl(format!("'{}': {}", path, e)))?;

        Ok(url.into())
    }
}
