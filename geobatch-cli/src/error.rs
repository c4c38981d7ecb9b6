//! CLI error type.

use std::fmt;

use geobatch::config::ConfigError;
use geobatch::provider::ProviderError;
use geobatch::sheet::SheetError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid or incomplete configuration.
    Config(String),

    /// Config file could not be read or written.
    ConfigFile(ConfigError),

    /// Input or output sheet failure.
    Sheet(SheetError),

    /// HTTP client setup failure.
    Http(ProviderError),

    /// A single-address lookup returned an error outcome.
    Lookup(String),

    /// Logging could not be initialised.
    Logging(String),

    /// Interrupted by the user; partial output was written.
    Cancelled { processed: usize, total: usize },
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Cancelled { .. } => 130,
            CliError::Config(_) | CliError::ConfigFile(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Sheet(e) => write!(f, "{}", e),
            CliError::Http(e) => write!(f, "{}", e),
            CliError::Lookup(msg) => write!(f, "Lookup failed: {}", msg),
            CliError::Logging(msg) => write!(f, "Failed to initialise logging: {}", msg),
            CliError::Cancelled { processed, total } => {
                write!(f, "Cancelled after {} of {} rows", processed, total)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Sheet(e) => Some(e),
            CliError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<SheetError> for CliError {
    fn from(e: SheetError) -> Self {
        CliError::Sheet(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Http(e)
    }
}
