//! TimedOperation - timer wrapped around a relay invocation
//!
//! The timer starts before the relay is built (so before the first pull) and
//! stops as soon as the relay reaches a terminal state, before the sink is
//! ended.

use std::sync::Arc;

use contracts::{ContractError, RecordSink};
use observability::{OperationTimer, TimerHandle};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::relay::{RelayOutcome, StreamRelay};

/// A started timer waiting for the relay it measures
pub struct TimedOperation {
    handle: TimerHandle,
}

impl TimedOperation {
    /// Start timing now
    pub fn start(timer: &Arc<OperationTimer>) -> Self {
        Self {
            handle: timer.start(),
        }
    }

    pub fn timer_name(&self) -> &str {
        self.handle.timer_name()
    }

    /// Spawn `relay`, stopping the timer on its terminal event
    ///
    /// The timer is stopped before the sink is ended, so before `on_terminal`
    /// runs. If the relay task is dropped before terminating, the handle is
    /// stopped when the relay drops it.
    pub fn spawn_relay<D, W, K, F, H>(
        self,
        relay: StreamRelay<D, W, K, F>,
        on_terminal: H,
    ) -> JoinHandle<RelayOutcome>
    where
        D: Send + 'static,
        W: Send + 'static,
        K: RecordSink<W> + Send + 'static,
        F: Fn(D) -> Result<W, ContractError> + Send + 'static,
        H: FnOnce(&RelayOutcome) + Send + 'static,
    {
        let mut handle = self.handle;
        relay
            .on_terminal_state(move |state| {
                if let Some(elapsed) = handle.stop() {
                    debug!(
                        timer = %handle.timer_name(),
                        elapsed_us = elapsed.as_micros() as u64,
                        state = ?state,
                        "Operation timer stopped"
                    );
                }
            })
            .spawn(on_terminal)
    }
}

/// Start `timer` and spawn `relay` under it
pub fn with_timing<D, W, K, F, H>(
    timer: &Arc<OperationTimer>,
    relay: StreamRelay<D, W, K, F>,
    on_terminal: H,
) -> JoinHandle<RelayOutcome>
where
    D: Send + 'static,
    W: Send + 'static,
    K: RecordSink<W> + Send + 'static,
    F: Fn(D) -> Result<W, ContractError> + Send + 'static,
    H: FnOnce(&RelayOutcome) + Send + 'static,
{
    TimedOperation::start(timer).spawn_relay(relay, on_terminal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::sinks::ChannelSink;
    use media_source::ScriptedSource;
    use observability::TimerRegistry;
    use std::io;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::time::Duration;

    fn identity(item: u32) -> Result<u32, ContractError> {
        Ok(item)
    }

    fn counting_hook() -> (Arc<AtomicUsize>, impl FnOnce(&RelayOutcome) + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook_calls = Arc::clone(&calls);
        (calls, move |_outcome: &RelayOutcome| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Sink whose `end()` never resolves
    struct StallingSink;

    impl RecordSink<u32> for StallingSink {
        fn name(&self) -> &str {
            "stalling"
        }

        fn is_writable(&self) -> bool {
            true
        }

        async fn drained(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        fn write(&mut self, _item: u32) -> Result<(), ContractError> {
            Ok(())
        }

        async fn end(&mut self) -> Result<(), ContractError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_timer_stopped_once_on_completion() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.completed", "completed stream");
        let (sink, mut rx) = ChannelSink::bounded("test", 4);
        let source = ScriptedSource::new(vec![1u32, 2, 3]).into_stream();

        let outcome = with_timing(&timer, StreamRelay::new("test", source, sink, identity), |_| {})
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item);
        }
        assert_eq!(received, vec![1, 2, 3]);

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.active, 0);
    }

    #[tokio::test]
    async fn test_timer_stopped_once_on_failure() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.failed", "failed stream");
        let (sink, _rx) = ChannelSink::bounded("test", 4);
        let source = ScriptedSource::new(vec![1u32])
            .fail_with(io::Error::other("disk").into())
            .into_stream();

        let outcome = with_timing(&timer, StreamRelay::new("test", source, sink, identity), |_| {})
            .await
            .unwrap();

        assert!(!outcome.is_completed());
        assert_eq!(timer.snapshot().count, 1);
        assert_eq!(timer.snapshot().active, 0);
    }

    #[tokio::test]
    async fn test_timer_stopped_before_hook() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.order", "hook order");
        let (sink, _rx) = ChannelSink::bounded("test", 1);
        let source = ScriptedSource::<u32>::empty().into_stream();

        let seen = Arc::new(AtomicU64::new(u64::MAX));
        let hook_seen = Arc::clone(&seen);
        let hook_timer = Arc::clone(&timer);

        with_timing(
            &timer,
            StreamRelay::new("test", source, sink, identity),
            move |_| hook_seen.store(hook_timer.snapshot().count, Ordering::SeqCst),
        )
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timer_measures_stream_duration() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.duration", "duration");
        let (sink, _rx) = ChannelSink::bounded("test", 8);
        let source = ScriptedSource::new(vec![1u32, 2])
            .with_delay(Duration::from_millis(15))
            .into_stream();

        let operation = TimedOperation::start(&timer);
        assert_eq!(operation.timer_name(), "test.duration");
        operation
            .spawn_relay(StreamRelay::new("test", source, sink, identity), |_| {})
            .await
            .unwrap();

        assert!(timer.snapshot().last >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_aborted_relay_still_stops_timer() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.aborted", "aborted");
        let (sink, _rx) = ChannelSink::bounded("test", 1);
        let source = futures::StreamExt::boxed(futures::stream::pending::<Result<u32, ContractError>>());

        let handle = with_timing(&timer, StreamRelay::new("test", source, sink, identity), |_| {});
        tokio::task::yield_now().await;
        assert_eq!(timer.snapshot().active, 1);

        handle.abort();
        let _ = handle.await;

        assert_eq!(timer.snapshot().count, 1);
        assert_eq!(timer.snapshot().active, 0);
    }

    #[tokio::test]
    async fn test_timer_stops_before_sink_end_completes() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.stalled_end", "stalled end");
        let source = ScriptedSource::<u32>::empty().into_stream();
        let (calls, hook) = counting_hook();

        let handle = with_timing(&timer, StreamRelay::new("test", source, StallingSink, identity), hook);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.active, 0);
        // Still waiting on end(): the outcome hook has not run
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!handle.is_finished());

        handle.abort();
        let _ = handle.await;
        assert_eq!(timer.snapshot().count, 1);
    }

    #[tokio::test]
    async fn test_timer_stopped_once_on_transform_failure() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.transform_failed", "transform failure");
        let (sink, _rx) = ChannelSink::bounded("test", 4);
        let source = ScriptedSource::new(vec![1u32, 0, 3]).into_stream();
        let transform = |item: u32| {
            if item == 0 {
                Err(ContractError::transform("0", "zero is not a record"))
            } else {
                Ok(item)
            }
        };
        let (calls, hook) = counting_hook();

        let outcome = with_timing(&timer, StreamRelay::new("test", source, sink, transform), hook)
            .await
            .unwrap();

        assert!(matches!(outcome.error(), Some(RelayError::Transform(_))));
        assert_eq!(outcome.written(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.active, 0);
    }

    #[tokio::test]
    async fn test_timer_stopped_once_on_sink_write_failure() {
        let registry = TimerRegistry::new();
        let timer = registry.timer("test.sink_failed", "sink failure");
        let (sink, rx) = ChannelSink::bounded("test", 4);
        drop(rx);
        let source = ScriptedSource::new(vec![1u32, 2]).into_stream();
        let (calls, hook) = counting_hook();

        let outcome = with_timing(&timer, StreamRelay::new("test", source, sink, identity), hook)
            .await
            .unwrap();

        assert!(matches!(
            outcome.error(),
            Some(RelayError::Sink(ContractError::SinkClosed { .. }))
        ));
        assert_eq!(outcome.written(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.active, 0);
    }
}
