//! LogSink - logs each outbound movie via tracing

use contracts::{ContractError, GrpcMovie, RecordSink};
use tracing::{info, instrument};

/// Sink that logs movie summaries instead of sending them anywhere
pub struct LogSink {
    name: String,
    written: u64,
    closed: bool,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            written: 0,
            closed: false,
        }
    }

    /// Movies logged so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl RecordSink<GrpcMovie> for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_writable(&self) -> bool {
        !self.closed
    }

    async fn drained(&mut self) -> Result<(), ContractError> {
        // Never reports full
        Ok(())
    }

    fn write(&mut self, movie: GrpcMovie) -> Result<(), ContractError> {
        if self.closed {
            return Err(ContractError::sink_closed(&self.name));
        }
        self.written += 1;
        info!(
            sink = %self.name,
            id = %movie.id,
            title = %movie.title,
            year = movie.year,
            genres = %movie.genres,
            "Movie sent"
        );
        Ok(())
    }

    #[instrument(name = "log_sink_end", skip(self))]
    async fn end(&mut self) -> Result<(), ContractError> {
        self.closed = true;
        info!(sink = %self.name, movies = self.written, "LogSink closed");
        Ok(())
    }
}
