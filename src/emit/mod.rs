//! Channels and sinks.
//!
//! Audit records leave the process as JSON lines, one object per line,
//! through a named channel bound to a severity and a sink. Sinks cover
//! rotated files, the console, an in-memory capture for tests, and a
//! null destination for disabled channels.

mod channel;
mod sink;

pub use channel::{Channel, LOGIN_CHANNEL, MODEL_CHANNEL, REQUEST_CHANNEL};
pub use sink::{ConsoleSink, FileSink, MemorySink, NullSink, Sink};
