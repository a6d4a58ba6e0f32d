//! Download engine: packs one after another, assets within a pack at once.
//!
//! This module provides the [`DownloadEngine`] which turns [`Pack`]s into
//! files under `output_root/<pack name>/`, reporting one [`ProgressEvent`]
//! per terminal outcome.
//!
//! # Concurrency Model
//!
//! - Packs are processed sequentially; pack N+1 starts no network activity
//!   before every target of pack N has reached a terminal state
//! - Within a pack, every resolved target (static and animated variant of
//!   every item) runs in its own Tokio task, without a fan-out cap
//! - Tasks live in a [`JoinSet`] that is drained before the pack returns, so
//!   a panicking task is observed and reported instead of lost
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sticker_core::download::{DownloadEngine, HttpClient, RetryPolicy};
//! use sticker_core::progress::LogReporter;
//! use sticker_core::catalog::{Item, Pack};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(
//!     Arc::new(HttpClient::new()?),
//!     RetryPolicy::default(),
//!     Arc::new(LogReporter),
//!     "stickers",
//! );
//! let pack = Pack {
//!     name: "Pack A".to_string(),
//!     items: vec![Item {
//!         display_name: "smile".to_string(),
//!         static_url: Some("https://example.com/a.png".to_string()),
//!         animated_url: None,
//!     }],
//! };
//! let stats = engine.download_pack(&pack).await;
//! println!("succeeded: {}, skipped: {}", stats.succeeded(), stats.skipped());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::io::AsyncWriteExt;
use tokio::task::{self, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

#[cfg(unix)]
use super::constants::{ASSET_FILE_MODE, PACK_DIR_MODE};
use super::resolver::{DownloadTarget, resolve_targets};
use super::retry::{FetchOutcome, RetryPolicy, RetryingFetcher};
use super::{DownloadError, HttpFetch};
use crate::catalog::{Pack, is_single_path_component};
use crate::progress::{ProgressEvent, ProgressReporter};

/// Statistics from a download run.
///
/// Uses atomic counters for thread-safe updates from concurrent download
/// tasks. Every target lands in exactly one of succeeded, skipped, failed
/// or unparseable; `retried` counts retry pauses.
#[derive(Debug, Default)]
pub struct DownloadStats {
    succeeded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    unparseable: AtomicUsize,
    retried: AtomicUsize,
    interrupted: AtomicBool,
}

impl DownloadStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of assets fetched and written.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Returns the number of assets already present on disk.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the number of assets that could not be obtained or stored.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of catalog links that could not be parsed.
    #[must_use]
    pub fn unparseable(&self) -> usize {
        self.unparseable.load(Ordering::SeqCst)
    }

    /// Returns the number of retry attempts made.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    /// Returns the number of targets that reached a terminal state.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.skipped() + self.failed() + self.unparseable()
    }

    /// Returns whether the run stopped early because of an interrupt.
    #[must_use]
    pub fn was_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn record_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn record_unparseable(&self) {
        self.unparseable.fetch_add(1, Ordering::SeqCst);
    }

    fn record_retry(&self) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }

    fn mark_interrupted(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    fn snapshot(&self) -> Self {
        Self {
            succeeded: AtomicUsize::new(self.succeeded()),
            skipped: AtomicUsize::new(self.skipped()),
            failed: AtomicUsize::new(self.failed()),
            unparseable: AtomicUsize::new(self.unparseable()),
            retried: AtomicUsize::new(self.retried()),
            interrupted: AtomicBool::new(self.was_interrupted()),
        }
    }
}

/// Download engine for sticker packs.
///
/// Holds everything a run needs: the authenticated fetch capability (inside
/// a [`RetryingFetcher`]), the progress sink, the output root and the
/// interrupt flag. Nothing is global.
pub struct DownloadEngine {
    fetcher: RetryingFetcher,
    reporter: Arc<dyn ProgressReporter>,
    output_root: PathBuf,
    interrupted: Arc<AtomicBool>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("fetcher", &self.fetcher)
            .field("output_root", &self.output_root)
            .field("interrupted", &self.interrupted)
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates an engine writing packs under `output_root`.
    #[must_use]
    pub fn new(
        http: Arc<dyn HttpFetch>,
        retry_policy: RetryPolicy,
        reporter: Arc<dyn ProgressReporter>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        let output_root = output_root.into();
        debug!(
            output_root = %output_root.display(),
            max_attempts = retry_policy.max_attempts(),
            retry_delay_ms = retry_policy.delay().as_millis(),
            "creating download engine"
        );
        Self {
            fetcher: RetryingFetcher::new(http, retry_policy),
            reporter,
            output_root,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares an interrupt flag with the engine.
    ///
    /// Once the flag is set, no new pack and no new fetch is started and no
    /// further events are reported. Fetches already running are not
    /// cancelled.
    #[must_use]
    pub fn with_interrupt_flag(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = interrupted;
        self
    }

    /// Returns the directory packs are created under.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.fetcher.policy()
    }

    /// Returns the directory the assets of `pack` are written to.
    ///
    /// `None` when the pack name is not a single path component and would
    /// resolve outside the output root.
    #[must_use]
    pub fn pack_dir(&self, pack: &Pack) -> Option<PathBuf> {
        is_single_path_component(&pack.name).then(|| self.output_root.join(&pack.name))
    }

    /// Downloads one pack and reports completion.
    ///
    /// Returns once every target of the pack has reached a terminal state.
    /// Asset failures never surface as errors; they are reported and
    /// counted in the returned stats.
    #[instrument(skip(self, pack), fields(pack = %pack.name))]
    pub async fn download_pack(&self, pack: &Pack) -> DownloadStats {
        let started = Instant::now();
        let stats = Arc::new(DownloadStats::new());
        if self.is_interrupted() {
            stats.mark_interrupted();
        } else {
            self.run_pack(pack, started, &stats).await;
        }
        self.finish(started, stats)
    }

    /// Downloads every pack in order, one pack at a time.
    #[instrument(skip(self, packs), fields(packs = packs.len()))]
    pub async fn download_all(&self, packs: &[Pack]) -> DownloadStats {
        let started = Instant::now();
        let stats = Arc::new(DownloadStats::new());

        for pack in packs {
            if self.is_interrupted() {
                stats.mark_interrupted();
                break;
            }
            self.run_pack(pack, started, &stats).await;
        }

        self.finish(started, stats)
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn finish(&self, started: Instant, stats: Arc<DownloadStats>) -> DownloadStats {
        if self.is_interrupted() {
            stats.mark_interrupted();
        } else {
            self.reporter.report(ProgressEvent::finished(started.elapsed()));
        }

        info!(
            succeeded = stats.succeeded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            unparseable = stats.unparseable(),
            retried = stats.retried(),
            interrupted = stats.was_interrupted(),
            elapsed_ms = started.elapsed().as_millis(),
            "download run complete"
        );

        // Every task has been joined, so this is normally the only handle.
        Arc::try_unwrap(stats).unwrap_or_else(|shared| shared.snapshot())
    }

    async fn run_pack(&self, pack: &Pack, started: Instant, stats: &Arc<DownloadStats>) {
        info!(pack = %pack.name, items = pack.items.len(), "downloading pack");

        let Some(pack_dir) = self.pack_dir(pack) else {
            warn!(pack = %pack.name, "pack name is not a plain directory name, skipping pack");
            stats.record_failed();
            self.reporter.report(ProgressEvent::failed(
                Path::new(&pack.name),
                "pack name is not a plain directory name",
                started.elapsed(),
            ));
            return;
        };

        if let Err(e) = create_pack_dir(&pack_dir).await {
            warn!(dir = %pack_dir.display(), error = %e, "cannot create pack directory");
            stats.record_failed();
            self.reporter.report(ProgressEvent::failed(
                &pack_dir,
                &e.to_string(),
                started.elapsed(),
            ));
            return;
        }

        let mut tasks = JoinSet::new();
        let mut task_paths: HashMap<task::Id, PathBuf> = HashMap::new();
        for item in &pack.items {
            for resolved in resolve_targets(item, &pack_dir) {
                match resolved {
                    Ok(target) => {
                        let task = TargetTask {
                            fetcher: self.fetcher.clone(),
                            reporter: Arc::clone(&self.reporter),
                            stats: Arc::clone(stats),
                            interrupted: Arc::clone(&self.interrupted),
                            started,
                        };
                        let local_path = target.local_path.clone();
                        let handle = tasks.spawn(task.run(target));
                        task_paths.insert(handle.id(), local_path);
                    }
                    Err(link) => {
                        warn!(
                            sticker = %link.display_name,
                            link = %link.link,
                            reason = link.reason,
                            "unparseable download link"
                        );
                        stats.record_unparseable();
                        self.reporter.report(ProgressEvent::link_unparseable(
                            &link.display_name,
                            &link.link,
                            started.elapsed(),
                        ));
                    }
                }
            }
        }

        debug!(task_count = tasks.len(), "waiting for pack downloads to complete");

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                let path = task_paths.get(&e.id()).map_or(pack_dir.as_path(), PathBuf::as_path);
                warn!(path = %path.display(), error = %e, "download task panicked");
                stats.record_failed();
                if !self.is_interrupted() {
                    self.reporter.report(ProgressEvent::failed(
                        path,
                        &format!("download task failed: {e}"),
                        started.elapsed(),
                    ));
                }
            }
        }

        info!(pack = %pack.name, "pack complete");
    }
}

/// Everything one spawned download task needs, owned so the task is `'static`.
struct TargetTask {
    fetcher: RetryingFetcher,
    reporter: Arc<dyn ProgressReporter>,
    stats: Arc<DownloadStats>,
    interrupted: Arc<AtomicBool>,
    started: Instant,
}

impl TargetTask {
    #[instrument(skip(self, target), fields(url = %target.source_url, path = %target.local_path.display()))]
    async fn run(self, target: DownloadTarget) {
        if self.is_interrupted() {
            debug!("interrupted before fetch, not starting");
            return;
        }

        // Checked right before fetching so a file written by an earlier
        // sibling with the same name is seen.
        let outcome = if path_exists(&target.local_path).await {
            AssetOutcome::Skipped("file already exists".to_string())
        } else {
            let fetched = self
                .fetcher
                .fetch(&target.source_url, |notice| {
                    self.stats.record_retry();
                    self.emit(ProgressEvent::retrying(
                        notice.failed_attempt,
                        &target.local_path,
                        &notice.error.to_string(),
                        self.started.elapsed(),
                    ));
                })
                .await;
            match AssetOutcome::from_fetch(fetched) {
                AssetOutcome::Fetched(body) => match write_asset(&target.local_path, &body).await {
                    Ok(()) => AssetOutcome::Fetched(body),
                    Err(e) => AssetOutcome::Failed(e.to_string()),
                },
                other => other,
            }
        };

        self.settle(&target, outcome);
    }

    fn settle(&self, target: &DownloadTarget, outcome: AssetOutcome) {
        let elapsed = self.started.elapsed();
        match outcome {
            AssetOutcome::Fetched(body) => {
                info!(bytes = body.len(), "download completed");
                self.stats.record_succeeded();
                self.emit(ProgressEvent::succeeded(&target.local_path, elapsed));
            }
            AssetOutcome::Skipped(reason) => {
                debug!(%reason, "skipping download");
                self.stats.record_skipped();
                self.emit(ProgressEvent::skipped(&target.local_path, elapsed));
            }
            AssetOutcome::Failed(cause) => {
                warn!(%cause, "download failed after all attempts");
                self.stats.record_failed();
                self.emit(ProgressEvent::failed(&target.local_path, &cause, elapsed));
            }
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if !self.is_interrupted() {
            self.reporter.report(event);
        }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// Terminal state of one target task.
#[derive(Debug, PartialEq, Eq)]
enum AssetOutcome {
    Fetched(Vec<u8>),
    Skipped(String),
    Failed(String),
}

impl AssetOutcome {
    /// Folds a fetch result into the three states a task can end in.
    ///
    /// Links are resolved before a task is spawned and the fetcher settles
    /// every transient failure itself, so any outcome other than success or
    /// skip ends the asset as failed.
    fn from_fetch(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success(body) => Self::Fetched(body),
            FetchOutcome::Skipped(reason) => Self::Skipped(reason),
            FetchOutcome::TerminalFailure(error) | FetchOutcome::TransientFailure(error) => {
                Self::Failed(error.to_string())
            }
            FetchOutcome::LinkUnparseable(reason) => Self::Failed(reason),
        }
    }
}

async fn create_pack_dir(dir: &Path) -> Result<(), DownloadError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(PACK_DIR_MODE);
    builder
        .create(dir)
        .await
        .map_err(|e| DownloadError::io(dir, e))
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Writes `body` to `path`, creating or truncating it.
async fn write_asset(path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(ASSET_FILE_MODE);

    let mut file = options
        .open(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    file.write_all(body)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    file.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(())
}
