//! ChannelSink - bounded channel as the outbound half of a stream
//!
//! The receiving half is what a server-streaming response reads from; the
//! channel capacity is the sink's write queue.

use contracts::{ContractError, RecordSink};
use tokio::sync::mpsc::{self, error::TrySendError, OwnedPermit};
use tracing::{debug, instrument};

/// Sink writing into a bounded tokio channel
///
/// Not writable while the channel is full. `drained` reserves a slot, and the
/// next `write` uses it. `end` drops the sender so the receiver sees the end
/// of the stream once it has read everything.
pub struct ChannelSink<W> {
    name: String,
    tx: Option<mpsc::Sender<W>>,
    permit: Option<OwnedPermit<W>>,
}

impl<W: Send + 'static> ChannelSink<W> {
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<W>) -> Self {
        Self {
            name: name.into(),
            tx: Some(tx),
            permit: None,
        }
    }

    /// Create a sink and the receiver it feeds
    pub fn bounded(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<W>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(name, tx), rx)
    }

    fn sender(&self) -> Result<&mpsc::Sender<W>, ContractError> {
        self.tx
            .as_ref()
            .ok_or_else(|| ContractError::sink_closed(&self.name))
    }
}

impl<W: Send + 'static> RecordSink<W> for ChannelSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_writable(&self) -> bool {
        self.permit.is_some() || self.tx.as_ref().is_some_and(|tx| tx.capacity() > 0)
    }

    async fn drained(&mut self) -> Result<(), ContractError> {
        if self.permit.is_some() {
            return Ok(());
        }

        let tx = self.sender()?.clone();
        let permit = tx
            .reserve_owned()
            .await
            .map_err(|_| ContractError::sink_closed(&self.name))?;
        self.permit = Some(permit);
        Ok(())
    }

    fn write(&mut self, item: W) -> Result<(), ContractError> {
        if let Some(permit) = self.permit.take() {
            permit.send(item);
            return Ok(());
        }

        self.sender()?.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => ContractError::sink_write(&self.name, "channel full"),
            TrySendError::Closed(_) => ContractError::sink_closed(&self.name),
        })
    }

    #[instrument(name = "channel_sink_end", skip(self), fields(sink = %self.name))]
    async fn end(&mut self) -> Result<(), ContractError> {
        self.permit = None;
        self.tx = None;
        debug!(sink = %self.name, "ChannelSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_full_then_drained() {
        let (mut sink, mut rx) = ChannelSink::bounded("test", 1);

        assert!(sink.is_writable());
        sink.write(1u32).unwrap();
        assert!(!sink.is_writable());

        assert_eq!(rx.recv().await, Some(1));
        sink.drained().await.unwrap();
        assert!(sink.is_writable());
        sink.write(2).unwrap();

        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn test_channel_sink_end_closes_stream() {
        let (mut sink, mut rx) = ChannelSink::bounded("test", 4);
        sink.write("a").unwrap();
        sink.end().await.unwrap();

        assert_eq!(rx.recv().await, Some("a"));
        assert_eq!(rx.recv().await, None);
        assert!(!sink.is_writable());
        assert!(matches!(
            sink.write("b"),
            Err(ContractError::SinkClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_channel_sink_detects_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::bounded("test", 1);
        sink.write(1u8).unwrap();
        drop(rx);

        assert!(matches!(
            sink.drained().await,
            Err(ContractError::SinkClosed { .. })
        ));
        assert!(matches!(
            sink.write(2),
            Err(ContractError::SinkClosed { .. })
        ));
    }

    #[tokio::test]
    async fn test_channel_sink_name() {
        let (sink, _rx) = ChannelSink::<u8>::bounded("outbound", 1);
        assert_eq!(RecordSink::name(&sink), "outbound");
    }
}
