//! Settings structs, one per `[section]` of `config.ini`.

use std::path::PathBuf;

use super::file::config_directory;
use crate::blend::BlendConfig;
use crate::pipeline::DEFAULT_PARALLEL;
use crate::provider::{TileSource, DEFAULT_TILE_PATH, DEFAULT_TIMEOUT_SECS, DEFAULT_WORLD};

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "bluestitch.log";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub source: SourceSettings,
    pub render: RenderSettings,
    pub download: DownloadSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// The configured tile source, if a map address is set.
    pub fn tile_source(&self) -> Option<TileSource> {
        self.source
            .map_address
            .as_ref()
            .map(|address| TileSource::new(address, &self.source.tile_path, &self.source.world))
    }
}

/// Map server location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    /// Base address of the map; no default
    pub map_address: Option<String>,
    /// Tile path template with `{x}`, `{z}` and `{world}` placeholders
    pub tile_path: String,
    pub world: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            map_address: None,
            tile_path: DEFAULT_TILE_PATH.to_string(),
            world: DEFAULT_WORLD.to_string(),
        }
    }
}

/// Default blend settings for renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSettings {
    pub blend: BlendConfig,
}

/// Download behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    /// HTTP request timeout in seconds
    pub timeout: u64,
    /// Tiles processed at once
    pub parallel: usize,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_SECS,
            parallel: DEFAULT_PARALLEL,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE),
        }
    }
}
