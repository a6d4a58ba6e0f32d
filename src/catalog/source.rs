//! Catalog sources: the remote panel endpoint or a local JSON file.
//!
//! Both reduce to a generic [`serde_json::Value`] that [`parse_catalog`]
//! decodes. Neither source retries; a catalog that cannot be obtained ends
//! the run.
//!
//! [`parse_catalog`]: super::parse_catalog

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument};

use super::error::CatalogError;
use crate::download::HttpFetch;

/// Default sticker panel endpoint.
pub const DEFAULT_CATALOG_URL: &str =
    "https://api.bilibili.com/x/emote/setting/panel?business=reply";

/// Fetches the catalog document from a remote endpoint.
///
/// The fetch capability is expected to carry whatever session cookie the
/// endpoint requires.
///
/// # Errors
///
/// Returns [`CatalogError::Fetch`] when the request fails and
/// [`CatalogError::InvalidJson`] when the body is not JSON.
#[instrument(skip(fetch))]
pub async fn fetch_remote_catalog(fetch: &dyn HttpFetch, url: &str) -> Result<Value, CatalogError> {
    let body = fetch.get(url).await?;
    debug!(bytes = body.len(), "catalog body received");
    let document =
        serde_json::from_slice(&body).map_err(|e| CatalogError::invalid_json(url, e))?;
    info!("fetched sticker catalog");
    Ok(document)
}

/// Reads the catalog document from a local JSON file.
///
/// # Errors
///
/// Returns [`CatalogError::Unreadable`] when the file cannot be read and
/// [`CatalogError::InvalidJson`] when it is not JSON.
#[instrument(fields(path = %path.display()))]
pub async fn load_catalog_file(path: &Path) -> Result<Value, CatalogError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| CatalogError::unreadable(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| CatalogError::invalid_json(path.display().to_string(), e))
}
