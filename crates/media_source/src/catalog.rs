//! In-memory catalog service

use std::sync::Arc;

use async_channel::bounded;
use contracts::{MediaService, Movie, RecordStream, ServiceBlueprint};
use futures::StreamExt;
use tracing::{debug, instrument, Instrument, Span};

/// Producer buffer used when none is configured
const DEFAULT_BUFFER: usize = 16;

/// Movie catalog held in memory
///
/// Every call spawns a producer task that feeds a bounded channel, so the
/// producer runs ahead of the consumer by at most `buffer` movies.
/// Must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct CatalogMediaService {
    movies: Arc<Vec<Movie>>,
    buffer: usize,
}

impl CatalogMediaService {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self {
            movies: Arc::new(movies),
            buffer: DEFAULT_BUFFER,
        }
    }

    /// Build from a loaded blueprint
    ///
    /// `relay.channel_capacity` sizes the producer buffer.
    pub fn from_blueprint(blueprint: &ServiceBlueprint) -> Self {
        Self::new(blueprint.movies.clone()).with_buffer(blueprint.relay.channel_capacity)
    }

    /// Set the producer buffer (minimum 1)
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer.max(1);
        self
    }

    /// Catalog size
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    #[instrument(name = "catalog_produce", skip(self), fields(catalog = self.movies.len()))]
    fn produce(&self, needle: Option<String>) -> RecordStream<Movie> {
        let (tx, rx) = bounded(self.buffer);
        let movies = Arc::clone(&self.movies);

        let producer = async move {
            let mut produced = 0usize;
            let matching = movies
                .iter()
                .filter(|movie| needle.as_deref().is_none_or(|n| movie.matches(n)));

            for movie in matching {
                if tx.send(Ok(movie.clone())).await.is_err() {
                    debug!(produced, "Consumer dropped, producer stopping");
                    return;
                }
                produced += 1;
            }

            debug!(produced, "Catalog producer finished");
        };
        tokio::spawn(producer.instrument(Span::current()));

        rx.boxed()
    }
}

impl MediaService for CatalogMediaService {
    fn get_movies(&self) -> RecordStream<Movie> {
        self.produce(None)
    }

    fn search_movies(&self, search_text: &str) -> RecordStream<Movie> {
        self.produce(Some(search_text.trim().to_lowercase()))
    }
}
