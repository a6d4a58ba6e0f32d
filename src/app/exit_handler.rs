//! Exit code logic for the downloader process.
//!
//! Single responsibility: map a finished download run to the process exit outcome.

use sticker_core::DownloadStats;

use crate::ProcessExit;

/// Determines the process exit outcome of a download run.
///
/// Asset failures are reported per asset and do not fail the run; only an
/// interrupt changes the outcome.
pub(crate) fn determine_exit_outcome(stats: &DownloadStats, interrupt_received: bool) -> ProcessExit {
    if stats.was_interrupted() || interrupt_received {
        ProcessExit::Aborted
    } else {
        ProcessExit::Success
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;
    use sticker_core::DownloadStats;

    #[test]
    fn test_exit_outcome_success_for_clean_run() {
        assert_eq!(
            determine_exit_outcome(&DownloadStats::new(), false),
            ProcessExit::Success
        );
    }

    #[test]
    fn test_exit_outcome_aborted_on_interrupt() {
        assert_eq!(
            determine_exit_outcome(&DownloadStats::new(), true),
            ProcessExit::Aborted
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ProcessExit::Success.code(), 0);
        assert_eq!(ProcessExit::Failure.code(), 1);
        assert_eq!(ProcessExit::Aborted.code(), 130);
    }
}
