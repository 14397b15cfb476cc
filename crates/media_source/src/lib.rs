//! # Media Source
//!
//! Record producers behind the streaming operations.
//!
//! Responsibilities:
//! - Serve the configured movie catalog as an asynchronous `RecordStream`
//! - Search the catalog by text
//! - Scripted sources (fixed items, delays, injected failures) for tests and demos
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::MediaService;
//! use futures::StreamExt;
//! use media_source::CatalogMediaService;
//!
//! let service = CatalogMediaService::new(blueprint.movies.clone());
//! let mut movies = service.search_movies("alien");
//! while let Some(movie) = movies.next().await {
//!     println!("{}", movie?.title);
//! }
//! ```

mod catalog;
mod scripted;

pub use catalog::CatalogMediaService;
pub use contracts::{MediaService, Movie, RecordStream};
pub use scripted::{ScriptedMediaService, ScriptedSource};
