//! Sticker Downloader Core Library
//!
//! This library provides the core functionality for the sticker downloader,
//! which mirrors the sticker packs of a catalog into a local directory tree
//! (`<output>/<pack name>/<sticker name><extension>`).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - Session token lookup and cookie jar
//! - [`catalog`] - Catalog loading and parsing into packs and items
//! - [`download`] - Target resolution, retrying fetches, pack orchestration
//! - [`progress`] - Progress events and the sinks that carry them

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod catalog;
pub mod download;
pub mod progress;
mod user_agent;

// Re-export commonly used types
pub use auth::{CredentialError, SessionToken, resolve_session_token, session_cookie_jar};
pub use catalog::{CatalogError, Item, Pack, parse_catalog};
pub use download::{
    DownloadEngine, DownloadError, DownloadStats, DownloadTarget, FailureType, HttpClient,
    HttpFetch, RetryDecision, RetryPolicy, classify_error,
};
pub use progress::{ChannelReporter, EventKind, LogReporter, ProgressEvent, ProgressReporter};
