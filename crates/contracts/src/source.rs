//! MediaService trait - record producer abstraction
//!
//! The service behind the streaming operations. Each call returns a fresh,
//! independently consumed stream.

use futures::stream::BoxStream;

use crate::{ContractError, Movie};

/// Asynchronous, ordered record sequence
///
/// `None` means normal completion. An `Err` item aborts the sequence; nothing
/// after it is read.
pub type RecordStream<T> = BoxStream<'static, Result<T, ContractError>>;

/// Movie producer
pub trait MediaService: Send + Sync {
    /// Stream every movie
    fn get_movies(&self) -> RecordStream<Movie>;

    /// Stream movies matching `search_text`
    fn search_movies(&self, search_text: &str) -> RecordStream<Movie>;
}
