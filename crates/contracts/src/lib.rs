//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `Movie` is the domain record produced by a `MediaService`
//! - `GrpcMovie` is its wire form, written to a `RecordSink`
//! - Sources deliver `Result<T, ContractError>` items; the first `Err` is terminal

mod blueprint;
mod error;
mod movie;
mod sink;
mod source;
mod wire;

pub use blueprint::*;
pub use error::*;
pub use movie::*;
pub use sink::*;
pub use source::{MediaService, RecordStream};
pub use wire::*;
