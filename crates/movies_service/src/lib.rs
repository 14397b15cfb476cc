//! # Movies Service
//!
//! Server-streaming movie operations on top of the relay.
//!
//! Responsibilities:
//! - Map `Movie` records to their `GrpcMovie` wire form
//! - `get` streams the whole catalog, `search` the movies matching a text
//! - Time every invocation with the service's named timers

mod convert;
mod service;

pub use convert::movie_to_wire;
pub use service::{MoviesStreamService, GET_MOVIES, SEARCH_MOVIES};
