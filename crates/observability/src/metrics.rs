//! Relay counters
//!
//! Recorded through the `metrics` facade; exported by whichever recorder is
//! installed (Prometheus in the binary, a debugging recorder in tests).

use metrics::counter;

/// Terminal status of a relay invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    Completed,
    SourceFailed,
    TransformFailed,
    SinkFailed,
}

impl RelayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::SourceFailed => "source_failed",
            Self::TransformFailed => "transform_failed",
            Self::SinkFailed => "sink_failed",
        }
    }
}

/// Record one item handed to a sink
pub fn record_item_written(relay: &str) {
    counter!(
        "media_relay_items_written_total",
        "relay" => relay.to_string()
    )
    .increment(1);
}

/// Record a pause caused by a full sink
pub fn record_backpressure_pause(relay: &str) {
    counter!(
        "media_relay_backpressure_pauses_total",
        "relay" => relay.to_string()
    )
    .increment(1);
}

/// Record the terminal event of a relay
pub fn record_relay_outcome(relay: &str, status: RelayStatus) {
    counter!(
        "media_relay_streams_total",
        "relay" => relay.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
}
