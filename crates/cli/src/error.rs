//! Error types for CLI operations.

use relay::RelayError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Stream terminated with a failure
    #[error("{operation} stream failed after {written} movies: {source}")]
    StreamFailed {
        operation: String,
        written: u64,
        #[source]
        source: RelayError,
    },

    /// Stream task panicked or was cancelled
    #[error("{operation} stream did not terminate: {message}")]
    StreamAborted { operation: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn stream_failed(operation: impl Into<String>, written: u64, source: RelayError) -> Self {
        Self::StreamFailed {
            operation: operation.into(),
            written,
            source,
        }
    }

    pub fn stream_aborted(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StreamAborted {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
