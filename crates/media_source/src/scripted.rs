//! Scripted sources
//!
//! Deterministic producers used without a real catalog backend.

use std::io;
use std::time::Duration;

use contracts::{ContractError, MediaService, Movie, RecordStream};
use futures::{stream, StreamExt};

/// Source that replays a fixed list of items, then completes or fails
///
/// ```ignore
/// let source = ScriptedSource::new(vec![1, 2])
///     .with_delay(Duration::from_millis(5))
///     .fail_with(ContractError::source("db", "connection reset"))
///     .into_stream();
/// ```
pub struct ScriptedSource<T> {
    items: Vec<T>,
    delay: Option<Duration>,
    failure: Option<ContractError>,
}

impl<T: Send + 'static> ScriptedSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            delay: None,
            failure: None,
        }
    }

    /// Source that completes without items
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Wait `delay` before delivering each signal
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// End with `error` instead of completing
    pub fn fail_with(mut self, error: ContractError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn into_stream(self) -> RecordStream<T> {
        let signals = stream::iter(self.items.into_iter().map(Ok))
            .chain(stream::iter(self.failure.map(Err)));

        match self.delay {
            Some(delay) => signals
                .then(move |signal| async move {
                    tokio::time::sleep(delay).await;
                    signal
                })
                .boxed(),
            None => signals.boxed(),
        }
    }
}

/// MediaService over a fixed movie list with an optional injected failure
///
/// With `fail_after(n, kind)`, both operations deliver the first `n` matching
/// movies and then fail with an IO error of `kind`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMediaService {
    movies: Vec<Movie>,
    failure: Option<(usize, io::ErrorKind)>,
    delay: Option<Duration>,
}

impl ScriptedMediaService {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies,
            failure: None,
            delay: None,
        }
    }

    pub fn fail_after(mut self, items: usize, kind: io::ErrorKind) -> Self {
        self.failure = Some((items, kind));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn script(&self, movies: Vec<Movie>) -> RecordStream<Movie> {
        let mut source = match self.failure {
            Some((items, kind)) => ScriptedSource::new(movies.into_iter().take(items).collect())
                .fail_with(io::Error::new(kind, "scripted source failure").into()),
            None => ScriptedSource::new(movies),
        };
        if let Some(delay) = self.delay {
            source = source.with_delay(delay);
        }
        source.into_stream()
    }
}

impl MediaService for ScriptedMediaService {
    fn get_movies(&self) -> RecordStream<Movie> {
        self.script(self.movies.clone())
    }

    fn search_movies(&self, search_text: &str) -> RecordStream<Movie> {
        let needle = search_text.trim().to_lowercase();
        self.script(
            self.movies
                .iter()
                .filter(|movie| movie.matches(&needle))
                .cloned()
                .collect(),
        )
    }
}
