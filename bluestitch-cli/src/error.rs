//! CLI error handling with user-friendly messages.
//!
//! Centralizes error reporting for the CLI so every command prints errors
//! the same way and exits with a non-zero code.

use std::fmt;
use std::process;

use bluestitch::config::ConfigFileError;
use bluestitch::export::ExportError;
use bluestitch::pipeline::PipelineError;
use bluestitch::provider::ProviderError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file or setting problem
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Failed to install the Ctrl+C handler
    SignalHandler(String),
    /// Failed to create the HTTP client
    HttpClient(ProviderError),
    /// The run was aborted
    Pipeline(PipelineError),
    /// No tile could be rendered
    NothingRendered { last_error: Option<String> },
    /// Failed to write the output file
    Export(ExportError),
}

impl CliError {
    /// Prints the error with any hints and exits the process.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        let hints = self.hints();
        if !hints.is_empty() {
            eprintln!();
            for line in hints {
                eprintln!("{}", line);
            }
        }

        process::exit(1)
    }

    /// Follow-up advice printed below the error.
    fn hints(&self) -> &'static [&'static str] {
        match self {
            CliError::NothingRendered { .. } => &[
                "Common issues:",
                "  1. The map address is wrong or the map server is not running",
                "  2. The tile path does not match the server layout (see --tile-path)",
                "  3. The range lies outside the rendered part of the world",
            ],
            CliError::Config(_) => &["Run 'bluestitch config init' to create a config file."],
            _ => &[],
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::SignalHandler(msg) => write!(f, "Failed to set Ctrl+C handler: {}", msg),
            CliError::HttpClient(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Pipeline(e) => write!(f, "Render failed: {}", e),
            CliError::NothingRendered { last_error: None } => {
                write!(f, "No tiles were rendered")
            }
            CliError::NothingRendered {
                last_error: Some(e),
            } => write!(f, "No tiles were rendered (last error: {})", e),
            CliError::Export(e) => write!(f, "Export failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::HttpClient(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            CliError::Export(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Export(e)
    }
}
