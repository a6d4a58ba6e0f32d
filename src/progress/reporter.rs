//! Sinks that carry [`ProgressEvent`]s from download tasks to a UI or log.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::event::{EventKind, ProgressEvent};

/// Receives progress events from the download engine.
///
/// `report` is called concurrently from many download tasks. It must not
/// block for long and must never fail in a way that stops a download.
pub trait ProgressReporter: Send + Sync {
    /// Delivers one event.
    fn report(&self, event: ProgressEvent);
}

/// Forwards events over an unbounded channel to a single consumer.
///
/// The consumer (usually a live display) sees events in the order they were
/// sent. When the receiving side is gone, events are dropped silently.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    /// Creates a reporter and the receiver its events arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes every event to the tracing log.
///
/// Fatal events go out at `error`, failures and retries at `warn`,
/// everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, event: ProgressEvent) {
        let elapsed_ms = event.elapsed.as_millis();
        if event.kind == EventKind::Fatal {
            error!(kind = ?event.kind, elapsed_ms, "{}", event.message);
        } else if event.is_error || event.kind == EventKind::Retrying {
            warn!(kind = ?event.kind, elapsed_ms, "{}", event.message);
        } else {
            info!(kind = ?event.kind, elapsed_ms, "{}", event.message);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_channel_reporter_preserves_send_order() {
        let (reporter, mut rx) = ChannelReporter::channel();

        reporter.report(ProgressEvent::retrying(1, Path::new("a.png"), "timeout", Duration::ZERO));
        reporter.report(ProgressEvent::retrying(2, Path::new("a.png"), "timeout", Duration::ZERO));
        reporter.report(ProgressEvent::failed(Path::new("a.png"), "timeout", Duration::ZERO));
        drop(reporter);

        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![EventKind::Retrying, EventKind::Retrying, EventKind::Failed]
        );
    }

    #[tokio::test]
    async fn test_channel_reporter_from_many_tasks() {
        let (reporter, mut rx) = ChannelReporter::channel();
        let reporter: Arc<dyn ProgressReporter> = Arc::new(reporter);

        let mut handles = Vec::new();
        for i in 0..16 {
            let reporter = Arc::clone(&reporter);
            handles.push(tokio::spawn(async move {
                let path = format!("{i}.png");
                reporter.report(ProgressEvent::succeeded(Path::new(&path), Duration::ZERO));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        drop(reporter);

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 16);
    }

    #[test]
    fn test_channel_reporter_after_receiver_dropped_does_not_panic() {
        let (reporter, rx) = ChannelReporter::channel();
        drop(rx);
        reporter.report(ProgressEvent::finished(Duration::ZERO));
    }

    #[test]
    fn test_log_reporter_accepts_every_kind() {
        let reporter = LogReporter;
        reporter.report(ProgressEvent::succeeded(Path::new("a.png"), Duration::ZERO));
        reporter.report(ProgressEvent::retrying(1, Path::new("a.png"), "x", Duration::ZERO));
        reporter.report(ProgressEvent::failed(Path::new("a.png"), "x", Duration::ZERO));
        reporter.report(ProgressEvent::fatal("x", Duration::ZERO));
    }
}
