//! Shared User-Agent string for catalog and asset requests.

/// Default User-Agent for every request (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sticker-downloader/{version}")
}
