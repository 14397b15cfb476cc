//! Relay error types

use contracts::ContractError;
use observability::RelayStatus;
use thiserror::Error;

/// Why a relay invocation failed
///
/// Each variant wraps the original cause unchanged.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The source aborted the stream
    #[error("source failed: {0}")]
    Source(#[source] ContractError),

    /// A record could not be converted to its wire form
    #[error("transform failed: {0}")]
    Transform(#[source] ContractError),

    /// The sink rejected a write, closed while draining, or failed to end
    #[error("sink failed: {0}")]
    Sink(#[source] ContractError),
}

impl RelayError {
    /// The original cause
    pub fn cause(&self) -> &ContractError {
        match self {
            Self::Source(e) | Self::Transform(e) | Self::Sink(e) => e,
        }
    }

    pub fn into_cause(self) -> ContractError {
        match self {
            Self::Source(e) | Self::Transform(e) | Self::Sink(e) => e,
        }
    }

    /// Metric status for this failure
    pub fn status(&self) -> RelayStatus {
        match self {
            Self::Source(_) => RelayStatus::SourceFailed,
            Self::Transform(_) => RelayStatus::TransformFailed,
            Self::Sink(_) => RelayStatus::SinkFailed,
        }
    }
}
