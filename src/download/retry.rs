//! Retry logic with a fixed attempt budget and a constant delay.
//!
//! This module provides [`RetryPolicy`], [`FetchOutcome`] and
//! [`RetryingFetcher`], which performs one asset fetch with bounded retries.
//!
//! # Overview
//!
//! When a fetch attempt fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - connect, timeout or body read failures
//! - [`FailureType::Permanent`] - failures that cannot succeed on retry
//!
//! Transient failures are retried until the policy's attempt budget is
//! spent, pausing for the same delay before every retry. Connect failures
//! and body read failures draw from the same budget.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sticker_core::download::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(
//!     policy.should_retry(1),
//!     RetryDecision::Retry { delay: Duration::from_secs(3), attempt: 2 }
//! );
//! assert!(matches!(policy.should_retry(3), RetryDecision::DoNotRetry { .. }));
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use super::{DownloadError, HttpFetch};

/// Classification of fetch failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: connection refused, timeout, truncated body.
    Transient,

    /// Failure that won't succeed regardless of retries.
    ///
    /// Examples: invalid URL, local IO error, client misconfiguration.
    Permanent,
}

/// Decision on whether to retry a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the fetch after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the fetch.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Retry budget for one asset.
///
/// # Default Values
///
/// - `max_attempts`: 3 (the first attempt included)
/// - `delay`: 3 seconds, identical before every retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Pause before each retry.
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom attempt budget and delay.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause taken before each retry.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Determines whether to retry after a transient failure.
    ///
    /// `attempt` is the 1-indexed attempt that just failed.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }
        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}

/// Classifies a fetch error for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | Network | Transient |
/// | Timeout | Transient |
/// | InvalidUrl | Permanent |
/// | Io | Permanent |
/// | Client | Permanent |
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Network { .. } | DownloadError::Timeout { .. } => FailureType::Transient,
        DownloadError::InvalidUrl { .. } | DownloadError::Io { .. } | DownloadError::Client { .. } => {
            FailureType::Permanent
        }
    }
}

/// Result of trying to obtain one asset.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The body was fetched.
    Success(Vec<u8>),
    /// One attempt failed but the budget allows another.
    TransientFailure(DownloadError),
    /// The asset could not be obtained; no further attempts will be made.
    TerminalFailure(DownloadError),
    /// Nothing was fetched because the asset is already present.
    Skipped(String),
    /// The catalog link cannot be downloaded at all.
    LinkUnparseable(String),
}

/// Details handed to the retry observer before each retry pause.
#[derive(Debug)]
pub struct RetryNotice<'a> {
    /// The attempt that just failed (1-indexed).
    pub failed_attempt: u32,
    /// Total attempts allowed.
    pub max_attempts: u32,
    /// Pause before the next attempt.
    pub delay: Duration,
    /// Why the attempt failed.
    pub error: &'a DownloadError,
}

/// Fetches one URL with the attempt budget of a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryingFetcher {
    http: Arc<dyn HttpFetch>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingFetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryingFetcher {
    /// Creates a fetcher over an HTTP capability.
    #[must_use]
    pub fn new(http: Arc<dyn HttpFetch>, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    /// Returns the retry policy in use.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`, retrying transient failures.
    ///
    /// `on_retry` is called once per retry, before the pause, in attempt
    /// order. Returns [`FetchOutcome::Success`] on the first successful
    /// attempt, otherwise [`FetchOutcome::TerminalFailure`] carrying the
    /// last error.
    #[instrument(skip(self, on_retry), fields(max_attempts = self.policy.max_attempts))]
    pub async fn fetch<F>(&self, url: &str, mut on_retry: F) -> FetchOutcome
    where
        F: FnMut(&RetryNotice<'_>) + Send,
    {
        let mut attempt = 1u32;

        loop {
            debug!(attempt, "attempting fetch");

            match self.attempt(url).await {
                FetchOutcome::TransientFailure(error) => match self.policy.should_retry(attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        debug!(attempt, next_attempt, delay_ms = delay.as_millis(), error = %error, "will retry");
                        on_retry(&RetryNotice {
                            failed_attempt: attempt,
                            max_attempts: self.policy.max_attempts,
                            delay,
                            error: &error,
                        });
                        tokio::time::sleep(delay).await;
                        attempt = next_attempt;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        debug!(%reason, "not retrying fetch");
                        return FetchOutcome::TerminalFailure(error);
                    }
                },
                outcome => return outcome,
            }
        }
    }

    async fn attempt(&self, url: &str) -> FetchOutcome {
        match self.http.get(url).await {
            Ok(body) => FetchOutcome::Success(body),
            Err(error) => match classify_error(&error) {
                FailureType::Transient => FetchOutcome::TransientFailure(error),
                FailureType::Permanent => FetchOutcome::TerminalFailure(error),
            },
        }
    }
}
