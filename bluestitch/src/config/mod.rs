//! User configuration stored in `~/.bluestitch/config.ini`.
//!
//! ```ini
//! [source]
//! map_address = http://localhost:8100/
//! world = overworld
//!
//! [render]
//! contour = true
//! interval = 16
//!
//! [download]
//! parallel = 4
//! ```
//!
//! Every key is optional; unset keys take their defaults.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, DownloadSettings, LoggingSettings, RenderSettings, SourceSettings,
    DEFAULT_LOG_FILE,
};
