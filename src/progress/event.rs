//! Progress events emitted by the download engine.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rand::seq::SliceRandom;

const MARKERS: [&str; 10] = ["🍔", "🍕", "🌭", "🍣", "🍦", "🍩", "🍪", "🍎", "🍌", "🍇"];

/// What a [`ProgressEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An asset was fetched and written.
    Succeeded,
    /// An asset was already on disk; nothing was fetched.
    Skipped,
    /// An attempt failed and another one is scheduled.
    Retrying,
    /// An asset could not be obtained or stored.
    Failed,
    /// A catalog link cannot be downloaded at all.
    LinkUnparseable,
    /// Every requested pack has been processed.
    Finished,
    /// The run cannot continue (catalog or credentials unusable).
    Fatal,
}

/// One immutable progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Decorative marker shown in front of the message.
    pub marker: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Time since the download batch started.
    pub elapsed: Duration,
    /// Event category.
    pub kind: EventKind,
    /// Whether the event describes a failure.
    pub is_error: bool,
    /// Whether the event ends the run; a display stops after it.
    pub is_done: bool,
}

impl ProgressEvent {
    fn new(kind: EventKind, message: String, elapsed: Duration) -> Self {
        Self {
            marker: random_marker(),
            message,
            elapsed,
            kind,
            is_error: matches!(
                kind,
                EventKind::Failed | EventKind::LinkUnparseable | EventKind::Fatal
            ),
            is_done: matches!(kind, EventKind::Finished | EventKind::Fatal),
        }
    }

    /// An asset was written to `path`.
    #[must_use]
    pub fn succeeded(path: &Path, elapsed: Duration) -> Self {
        Self::new(
            EventKind::Succeeded,
            format!("downloaded {}", path.display()),
            elapsed,
        )
    }

    /// `path` already exists.
    #[must_use]
    pub fn skipped(path: &Path, elapsed: Duration) -> Self {
        Self::new(
            EventKind::Skipped,
            format!("{} already exists, skipping", path.display()),
            elapsed,
        )
    }

    /// Attempt `attempt` for `path` failed with `cause`; another follows.
    #[must_use]
    pub fn retrying(attempt: u32, path: &Path, cause: &str, elapsed: Duration) -> Self {
        Self::new(
            EventKind::Retrying,
            format!(
                "attempt {attempt} to download {} failed, retrying: {cause}",
                path.display()
            ),
            elapsed,
        )
    }

    /// `path` could not be obtained or stored.
    #[must_use]
    pub fn failed(path: &Path, cause: &str, elapsed: Duration) -> Self {
        Self::new(
            EventKind::Failed,
            format!("failed to download {}: {cause}", path.display()),
            elapsed,
        )
    }

    /// The link of sticker `display_name` is not downloadable.
    #[must_use]
    pub fn link_unparseable(display_name: &str, link: &str, elapsed: Duration) -> Self {
        Self::new(
            EventKind::LinkUnparseable,
            format!("cannot parse download link for {display_name}: {link}"),
            elapsed,
        )
    }

    /// All requested packs are done.
    #[must_use]
    pub fn finished(elapsed: Duration) -> Self {
        Self::new(EventKind::Finished, "download finished".to_string(), elapsed)
    }

    /// The run stops because of `message`.
    #[must_use]
    pub fn fatal(message: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(EventKind::Fatal, message.into(), elapsed)
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:.1?}", self.marker, self.message, self.elapsed)
    }
}

fn random_marker() -> &'static str {
    MARKERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MARKERS[0])
}
