//! Sink implementations
//!
//! Contains ChannelSink, FramedSink, and LogSink.

mod channel;
mod framed;
mod log;

pub use self::channel::ChannelSink;
pub use self::framed::{read_frames, FramedSink};
pub use self::log::LogSink;
