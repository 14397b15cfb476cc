//! StreamRelay - source to sink pump with backpressure
//!
//! State machine:
//!
//! ```text
//! Idle -> Pulling <-> Paused
//!            |           |
//!            v           v
//!      Completed | Failed
//! ```
//!
//! `Pulling` takes one signal from the source per step. `Paused` is entered
//! whenever the sink reports it is not writable and left once it drains.
//! Both terminal states end the sink once and hand the outcome to the
//! terminal hook once.

use std::marker::PhantomData;
use std::sync::Arc;

use contracts::{ContractError, RecordSink, RecordStream};
use futures::StreamExt;
use observability::{
    record_backpressure_pause, record_item_written, record_relay_outcome, RelayStatus,
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::RelayError;
use crate::metrics::RelayMetrics;

/// Relay lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Created, nothing pulled yet
    Idle,
    /// Taking the next signal from the source
    Pulling,
    /// Waiting for the sink to drain
    Paused,
    Completed,
    Failed,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Terminal event of a relay invocation
#[derive(Debug)]
pub enum RelayOutcome {
    /// Source completed and the sink was ended
    Completed { written: u64 },
    /// Stream aborted; `error` carries the original cause
    Failed { written: u64, error: RelayError },
}

impl RelayOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Items accepted by the sink before the terminal event
    pub fn written(&self) -> u64 {
        match self {
            Self::Completed { written } | Self::Failed { written, .. } => *written,
        }
    }

    pub fn error(&self) -> Option<&RelayError> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn status(&self) -> RelayStatus {
        match self {
            Self::Completed { .. } => RelayStatus::Completed,
            Self::Failed { error, .. } => error.status(),
        }
    }
}

/// Pump from a `RecordStream<D>` into a `RecordSink<W>` through `transform`
///
/// One relay serves one invocation: it is the only writer of its sink and
/// writes one record at a time in source order.
pub struct StreamRelay<D, W, K, F> {
    name: String,
    source: RecordStream<D>,
    sink: K,
    transform: F,
    state: RelayState,
    failure: Option<RelayError>,
    metrics: Arc<RelayMetrics>,
    terminal_state_hook: Option<TerminalStateHook>,
    _wire: PhantomData<fn() -> W>,
}

type TerminalStateHook = Box<dyn FnOnce(RelayState) + Send>;

impl<D, W, K, F> StreamRelay<D, W, K, F>
where
    D: Send + 'static,
    W: Send + 'static,
    K: RecordSink<W> + Send + 'static,
    F: Fn(D) -> Result<W, ContractError> + Send + 'static,
{
    pub fn new(name: impl Into<String>, source: RecordStream<D>, sink: K, transform: F) -> Self {
        Self {
            name: name.into(),
            source,
            sink,
            transform,
            state: RelayState::Idle,
            failure: None,
            metrics: Arc::new(RelayMetrics::new()),
            terminal_state_hook: None,
            _wire: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Call `hook` once the relay reaches `Completed` or `Failed`
    ///
    /// Runs before the sink is ended, so a slow or stuck `end()` does not
    /// delay it. A relay dropped before terminating drops the hook uncalled.
    pub fn on_terminal_state<G>(mut self, hook: G) -> Self
    where
        G: FnOnce(RelayState) + Send + 'static,
    {
        self.terminal_state_hook = Some(Box::new(hook));
        self
    }

    /// Shared counters, readable while the relay runs
    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Spawn the relay as a background task
    ///
    /// The task resolves to the same outcome that was passed to `on_terminal`.
    pub fn spawn<H>(self, on_terminal: H) -> JoinHandle<RelayOutcome>
    where
        H: FnOnce(&RelayOutcome) + Send + 'static,
    {
        tokio::spawn(self.run(on_terminal))
    }

    /// Drive the relay until the source terminates or a failure occurs
    ///
    /// The terminal state hook fires first, then `sink.end()` is called once,
    /// then `on_terminal` once.
    #[instrument(
        name = "stream_relay_run",
        skip(self, on_terminal),
        fields(relay = %self.name, sink = %self.sink.name())
    )]
    pub async fn run<H>(mut self, on_terminal: H) -> RelayOutcome
    where
        H: FnOnce(&RelayOutcome),
    {
        debug!(relay = %self.name, "Relay started");

        loop {
            let next = match self.state {
                RelayState::Idle => RelayState::Pulling,
                RelayState::Pulling => self.pull().await,
                RelayState::Paused => self.wait_for_drain().await,
                RelayState::Completed | RelayState::Failed => break,
            };
            self.transition(next);
        }

        if let Some(hook) = self.terminal_state_hook.take() {
            hook(self.state);
        }

        let outcome = self.finish().await;
        record_relay_outcome(&self.name, outcome.status());
        on_terminal(&outcome);
        outcome
    }

    fn transition(&mut self, next: RelayState) {
        if next != self.state {
            trace!(relay = %self.name, from = ?self.state, to = ?next, "Relay state change");
            self.state = next;
        }
    }

    /// One pull step: take a signal from the source and forward it
    async fn pull(&mut self) -> RelayState {
        if !self.sink.is_writable() {
            self.metrics.inc_pauses();
            record_backpressure_pause(&self.name);
            trace!(relay = %self.name, "Sink full, pausing source");
            return RelayState::Paused;
        }

        let item = match self.source.next().await {
            None => return RelayState::Completed,
            Some(Err(e)) => {
                self.metrics.inc_pulled();
                return self.fail(RelayError::Source(e));
            }
            Some(Ok(item)) => {
                self.metrics.inc_pulled();
                item
            }
        };

        let wire = match (self.transform)(item) {
            Ok(wire) => wire,
            Err(e) => return self.fail(RelayError::Transform(e)),
        };

        match self.sink.write(wire) {
            Ok(()) => {
                self.metrics.inc_written();
                record_item_written(&self.name);
                RelayState::Pulling
            }
            Err(e) => self.fail(RelayError::Sink(e)),
        }
    }

    async fn wait_for_drain(&mut self) -> RelayState {
        match self.sink.drained().await {
            Ok(()) => {
                trace!(relay = %self.name, "Sink drained, resuming source");
                RelayState::Pulling
            }
            Err(e) => self.fail(RelayError::Sink(e)),
        }
    }

    fn fail(&mut self, error: RelayError) -> RelayState {
        self.failure = Some(error);
        RelayState::Failed
    }

    /// End the sink and build the outcome
    async fn finish(&mut self) -> RelayOutcome {
        let written = self.metrics.written();
        let ended = self.sink.end().await;

        match (self.failure.take(), ended) {
            (None, Ok(())) => {
                info!(relay = %self.name, written, "Stream complete");
                RelayOutcome::Completed { written }
            }
            (None, Err(e)) => {
                self.transition(RelayState::Failed);
                error!(relay = %self.name, written, error = %e, "Failed to end stream");
                RelayOutcome::Failed {
                    written,
                    error: RelayError::Sink(e),
                }
            }
            (Some(error), ended) => {
                if let Err(e) = ended {
                    warn!(relay = %self.name, error = %e, "Failed to end stream after failure");
                }
                error!(relay = %self.name, written, error = %error, "An error occurred. Terminating stream.");
                RelayOutcome::Failed { written, error }
            }
        }
    }
}
