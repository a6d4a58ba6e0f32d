//! Error types for the catalog module.

use std::path::PathBuf;

use thiserror::Error;

use crate::download::DownloadError;

/// Errors that make a catalog unusable.
///
/// All variants are fatal to a run: nothing is downloaded from a catalog
/// that fails to load or decode.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The local catalog file could not be read.
    #[error("cannot read catalog file {path}: {source}")]
    Unreadable {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog source is not valid JSON.
    #[error("catalog from {origin} is not valid JSON: {source}")]
    InvalidJson {
        /// File path or URL the document came from.
        origin: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The remote catalog endpoint could not be fetched.
    #[error("failed to fetch catalog: {source}")]
    Fetch {
        /// The underlying request error.
        #[source]
        source: DownloadError,
    },

    /// The document decoded, but a required field has the wrong shape.
    #[error("malformed catalog at `{location}`: {reason}")]
    MalformedSchema {
        /// Where in the document the problem was found.
        location: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl CatalogError {
    /// Creates an unreadable-file error.
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-JSON error.
    pub fn invalid_json(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            origin: origin.into(),
            source,
        }
    }

    /// Creates a schema error.
    pub fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchema {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

impl From<DownloadError> for CatalogError {
    fn from(source: DownloadError) -> Self {
        Self::Fetch { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_names_location() {
        let error = CatalogError::malformed("data.all_packages[2].text", "expected a string");
        let msg = error.to_string();
        assert!(msg.contains("data.all_packages[2].text"), "got: {msg}");
        assert!(msg.contains("expected a string"), "got: {msg}");
    }

    #[test]
    fn test_unreadable_display_names_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = CatalogError::unreadable("/tmp/panel.json", io_err);
        assert!(error.to_string().contains("/tmp/panel.json"));
    }

    #[test]
    fn test_fetch_error_from_download_error() {
        let error: CatalogError = DownloadError::timeout("https://example.com/panel").into();
        assert!(matches!(error, CatalogError::Fetch { .. }));
        assert!(error.to_string().contains("timeout"));
    }
}
