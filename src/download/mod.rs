//! Fetching sticker assets and writing them to disk.
//!
//! This module turns catalog [`Pack`](crate::catalog::Pack)s into files
//! under `output_root/<pack name>/<display name><extension>`.
//!
//! # Features
//!
//! - Bounded retries with a fixed pause (3 attempts, 3 s apart by default)
//! - Skips assets that already exist, so reruns are idempotent
//! - Per-pack concurrency with strict pack-by-pack sequencing
//! - Structured error types with full context
//!
//! # Example
//!
//! ```no_run
//! use sticker_core::download::{HttpClient, HttpFetch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let body = client.get("https://example.com/smile.png").await?;
//! println!("fetched {} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod resolver;
mod retry;

pub use client::{HttpClient, HttpFetch};
pub use engine::{DownloadEngine, DownloadStats};
pub use error::DownloadError;
pub use resolver::{DownloadTarget, UnparseableLink, extension_from_link, resolve_targets};
pub use retry::{
    FailureType, FetchOutcome, RetryDecision, RetryNotice, RetryPolicy, RetryingFetcher,
    classify_error,
};
