//! RecordSink trait - relay output interface
//!
//! Defines the abstract interface for the outbound half of a streaming call.

use crate::ContractError;

/// Flow-controlled record output
///
/// A sink accepts buffered writes and reports when its buffer is full. The
/// writer is expected to stop writing while `is_writable` is false and to
/// wait on `drained` before writing again.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink<T> {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Whether another write can be accepted without exceeding the buffer
    fn is_writable(&self) -> bool;

    /// Wait until the sink can accept writes again
    ///
    /// # Errors
    /// Returns an error if the sink was closed while waiting
    async fn drained(&mut self) -> Result<(), ContractError>;

    /// Queue a record (never blocks)
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, item: T) -> Result<(), ContractError>;

    /// Flush pending records and close the stream
    async fn end(&mut self) -> Result<(), ContractError>;
}
