//! CLI runner for common setup.
//!
//! Loads the config file and initializes logging for commands that render.

use tracing::info;

use bluestitch::config::{ConfigFile, DEFAULT_LOG_FILE};
use bluestitch::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Holds the loaded configuration and keeps logging alive.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads config and initializes logging.
    ///
    /// Stdout logging is disabled on a TTY so it does not interfere with the
    /// progress bar; the log file always receives everything.
    pub fn with_debug(debug: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging(&log_dir, &log_file, stdout_enabled, debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Logs version and command name.
    pub fn log_startup(&self, command: &str) {
        info!("BlueStitch v{}", bluestitch::VERSION);
        info!("BlueStitch CLI: {} command", command);
    }
}
