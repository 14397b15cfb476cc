//! FramedSink - length-delimited protobuf frames over an async writer

use bytes::{Buf, BytesMut};
use contracts::{ContractError, RecordSink};
use prost::Message;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, trace};

/// Sink that encodes each record as a length-delimited protobuf frame
///
/// Frames accumulate in memory until the buffer reaches `high_water` bytes;
/// the sink then reports full until `drained` has written the buffer out.
pub struct FramedSink<Wr> {
    name: String,
    writer: Wr,
    buffer: BytesMut,
    high_water: usize,
    frames: u64,
    closed: bool,
}

impl<Wr: AsyncWrite + Unpin + Send> FramedSink<Wr> {
    pub fn new(name: impl Into<String>, writer: Wr, high_water: usize) -> Self {
        let high_water = high_water.max(1);
        Self {
            name: name.into(),
            writer,
            buffer: BytesMut::with_capacity(high_water),
            high_water,
            frames: 0,
            closed: false,
        }
    }

    /// Bytes waiting to be written out
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Frames accepted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> Wr {
        self.writer
    }

    fn ensure_open(&self) -> Result<(), ContractError> {
        if self.closed {
            return Err(ContractError::sink_closed(&self.name));
        }
        Ok(())
    }

    async fn flush_buffer(&mut self) -> Result<(), ContractError> {
        if !self.buffer.is_empty() {
            trace!(sink = %self.name, bytes = self.buffer.len(), "Writing buffered frames");
            self.writer.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        self.writer.flush().await?;
        Ok(())
    }
}

impl<M, Wr> RecordSink<M> for FramedSink<Wr>
where
    M: Message + Send + 'static,
    Wr: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_writable(&self) -> bool {
        !self.closed && self.buffer.len() < self.high_water
    }

    #[instrument(name = "framed_sink_drained", skip(self), fields(sink = %self.name))]
    async fn drained(&mut self) -> Result<(), ContractError> {
        self.ensure_open()?;
        self.flush_buffer().await
    }

    fn write(&mut self, item: M) -> Result<(), ContractError> {
        self.ensure_open()?;
        item.encode_length_delimited(&mut self.buffer)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        self.frames += 1;
        Ok(())
    }

    #[instrument(name = "framed_sink_end", skip(self), fields(sink = %self.name))]
    async fn end(&mut self) -> Result<(), ContractError> {
        if self.closed {
            return Ok(());
        }
        self.flush_buffer().await?;
        self.writer.shutdown().await?;
        self.closed = true;
        debug!(sink = %self.name, frames = self.frames, "FramedSink closed");
        Ok(())
    }
}

/// Decode every length-delimited frame in `bytes`
pub fn read_frames<M: Message + Default>(mut bytes: &[u8]) -> Result<Vec<M>, ContractError> {
    let mut frames = Vec::new();
    while bytes.has_remaining() {
        let frame = M::decode_length_delimited(&mut bytes)
            .map_err(|e| ContractError::Other(format!("invalid frame: {e}")))?;
        frames.push(frame);
    }
    Ok(frames)
}
