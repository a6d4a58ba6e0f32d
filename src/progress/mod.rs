//! Progress reporting between the download engine and whatever shows it.
//!
//! The engine only knows [`ProgressReporter`]. The CLI picks either a
//! [`ChannelReporter`] feeding its live display, or a [`LogReporter`] when
//! output is not a terminal.

mod event;
mod reporter;

pub use event::{EventKind, ProgressEvent};
pub use reporter::{ChannelReporter, LogReporter, ProgressReporter};
