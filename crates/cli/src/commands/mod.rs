//! Command implementations.

mod stream;
mod summary;
mod validate;

pub use stream::{run_get, run_search};
pub use validate::run_validate;
