//! MoviesStreamService - timed server-streaming movie operations

use std::sync::Arc;

use contracts::{GrpcMovie, MediaService, Movie, RecordSink, RecordStream, SearchRequest};
use observability::{OperationTimer, TimerRegistry};
use relay::{RelayOutcome, StreamRelay, TimedOperation};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::convert::movie_to_wire;

/// Timer suffix of the `get` operation
pub const GET_MOVIES: &str = "getMovies";
/// Timer suffix of the `search` operation
pub const SEARCH_MOVIES: &str = "searchMovies";

const GET_MOVIES_DESCRIPTION: &str = "Time spent streaming the full movie catalog";
const SEARCH_MOVIES_DESCRIPTION: &str = "Time spent streaming movies matching a search text";

/// Streams movies from a `MediaService` into caller-supplied sinks
///
/// Each call starts its operation timer, spawns a relay and returns without
/// waiting for the stream to finish.
pub struct MoviesStreamService {
    media: Arc<dyn MediaService>,
    get_timer: Arc<OperationTimer>,
    search_timer: Arc<OperationTimer>,
}

impl MoviesStreamService {
    /// Create a service whose timers live in the process-wide registry
    pub fn new(media: Arc<dyn MediaService>, metrics_prefix: &str) -> Self {
        Self::with_registry(media, metrics_prefix, TimerRegistry::global())
    }

    pub fn with_registry(
        media: Arc<dyn MediaService>,
        metrics_prefix: &str,
        registry: &TimerRegistry,
    ) -> Self {
        debug!(prefix = %metrics_prefix, "Initializing service metrics...");
        let get_timer = registry.timer(
            &format!("{metrics_prefix}.{GET_MOVIES}"),
            GET_MOVIES_DESCRIPTION,
        );
        let search_timer = registry.timer(
            &format!("{metrics_prefix}.{SEARCH_MOVIES}"),
            SEARCH_MOVIES_DESCRIPTION,
        );
        debug!("Service metrics initialized.");

        Self {
            media,
            get_timer,
            search_timer,
        }
    }

    pub fn get_timer(&self) -> &Arc<OperationTimer> {
        &self.get_timer
    }

    pub fn search_timer(&self) -> &Arc<OperationTimer> {
        &self.search_timer
    }

    /// Stream every movie into `sink`
    pub fn get<K>(&self, sink: K) -> JoinHandle<RelayOutcome>
    where
        K: RecordSink<GrpcMovie> + Send + 'static,
    {
        self.get_with(sink, |_| {})
    }

    /// Like [`get`](Self::get), calling `on_terminal` once the stream ends
    pub fn get_with<K, H>(&self, sink: K, on_terminal: H) -> JoinHandle<RelayOutcome>
    where
        K: RecordSink<GrpcMovie> + Send + 'static,
        H: FnOnce(&RelayOutcome) + Send + 'static,
    {
        debug!("Invoking get...");
        let timed = TimedOperation::start(&self.get_timer);
        let handle = stream_movies(GET_MOVIES, self.media.get_movies(), sink, timed, on_terminal);
        debug!("get stream has started.");
        handle
    }

    /// Stream the movies matching `request.search_text` into `sink`
    pub fn search<K>(&self, request: SearchRequest, sink: K) -> JoinHandle<RelayOutcome>
    where
        K: RecordSink<GrpcMovie> + Send + 'static,
    {
        self.search_with(request, sink, |_| {})
    }

    pub fn search_with<K, H>(
        &self,
        request: SearchRequest,
        sink: K,
        on_terminal: H,
    ) -> JoinHandle<RelayOutcome>
    where
        K: RecordSink<GrpcMovie> + Send + 'static,
        H: FnOnce(&RelayOutcome) + Send + 'static,
    {
        debug!(search_text = %request.search_text, "Invoking search...");
        let timed = TimedOperation::start(&self.search_timer);
        let source = self.media.search_movies(&request.search_text);
        let handle = stream_movies(SEARCH_MOVIES, source, sink, timed, on_terminal);
        debug!("search stream has started.");
        handle
    }
}

fn stream_movies<K, H>(
    operation: &str,
    source: RecordStream<Movie>,
    sink: K,
    timed: TimedOperation,
    on_terminal: H,
) -> JoinHandle<RelayOutcome>
where
    K: RecordSink<GrpcMovie> + Send + 'static,
    H: FnOnce(&RelayOutcome) + Send + 'static,
{
    let relay = StreamRelay::new(operation, source, sink, movie_to_wire);
    timed.spawn_relay(relay, on_terminal)
}
