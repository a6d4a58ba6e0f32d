//! Live progress display (spinner plus recent results) for download runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use sticker_core::progress::{EventKind, ProgressEvent};
use tokio::sync::mpsc::UnboundedReceiver;

pub(crate) const HEADER: &str = "downloading stickers...";

/// Results kept on screen below the header.
pub(crate) const VISIBLE_RESULTS: usize = 8;

const INTERRUPT_POLL: Duration = Duration::from_millis(100);

/// How the display ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FinalState {
    Finished,
    Aborted,
    Error,
}

impl FinalState {
    fn line(self) -> &'static str {
        match self {
            Self::Finished => "all done!",
            Self::Aborted => "aborted, run again to fetch what is missing",
            Self::Error => "stopped on error",
        }
    }
}

/// What the display shows: the latest results and, once known, the end state.
#[derive(Debug, Default)]
pub(crate) struct LiveView {
    results: VecDeque<String>,
    final_state: Option<FinalState>,
}

impl LiveView {
    /// Records one event. Returns `true` when the event ends the display.
    pub(crate) fn apply(&mut self, event: &ProgressEvent) -> bool {
        if self.results.len() == VISIBLE_RESULTS {
            self.results.pop_front();
        }
        self.results.push_back(event.to_string());

        if event.is_done {
            self.final_state = Some(if event.kind == EventKind::Fatal {
                FinalState::Error
            } else {
                FinalState::Finished
            });
        }
        event.is_done
    }

    /// Ends the display as aborted unless it already ended.
    pub(crate) fn abort(&mut self) {
        self.final_state.get_or_insert(FinalState::Aborted);
    }

    pub(crate) fn final_state(&self) -> Option<FinalState> {
        self.final_state
    }

    pub(crate) fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for line in &self.results {
            out.push('\n');
            out.push_str(line);
        }
        if let Some(state) = self.final_state {
            out.push_str("\n\n");
            out.push_str(state.line());
        }
        out
    }
}

/// Spawns the live display consuming `events` until the run ends.
///
/// The display stops on the first done event, when the channel closes, or
/// when `interrupted` is set. The last two end it as aborted.
pub(crate) fn spawn_progress_ui(
    mut events: UnboundedReceiver<ProgressEvent>,
    interrupted: Arc<AtomicBool>,
) -> tokio::task::JoinHandle<LiveView> {
    tokio::spawn(async move {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));

        let mut view = LiveView::default();
        spinner.set_message(view.render());

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let done = view.apply(&event);
                        spinner.set_message(view.render());
                        if done {
                            break;
                        }
                    }
                    None => {
                        view.abort();
                        break;
                    }
                },
                () = tokio::time::sleep(INTERRUPT_POLL) => {
                    if interrupted.load(Ordering::SeqCst) {
                        view.abort();
                        break;
                    }
                }
            }
        }

        spinner.finish_with_message(view.render());
        view
    })
}
