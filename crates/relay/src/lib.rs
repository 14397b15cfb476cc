//! # Relay
//!
//! Moves records from an asynchronous source to a flow-controlled sink.
//!
//! Responsibilities:
//! - Pull from the source only while the sink can accept writes
//! - Transform each record before writing, preserving source order
//! - Translate completion/failure into one `end()` and one terminal callback
//! - Time each invocation with a single-use timer handle

pub mod error;
pub mod metrics;
pub mod relay;
pub mod sinks;
pub mod timed;

pub use contracts::{RecordSink, RecordStream};
pub use error::RelayError;
pub use metrics::{RelayMetrics, RelayMetricsSnapshot};
pub use relay::{RelayOutcome, RelayState, StreamRelay};
pub use sinks::{read_frames, ChannelSink, FramedSink, LogSink};
pub use timed::{with_timing, TimedOperation};
