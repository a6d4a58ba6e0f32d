//! Derivation of download targets from catalog items.
//!
//! Each present link on an [`Item`] becomes one [`DownloadTarget`] whose file
//! is `pack_dir/<display name><extension>`. The extension is everything from
//! the link's last `.` to the end of the string, kept verbatim with its
//! leading dot. A query string after a dot therefore ends up in the file
//! name (`a.png?v=1.2` gives `.2`); existing sticker folders were written
//! with this rule, so it is kept.
//!
//! The file name must stay a single path component; a sticker name that
//! would place the file outside `pack_dir` is rejected like a bad link.

use std::path::{Path, PathBuf};

use crate::catalog::{Item, is_single_path_component};

const NO_EXTENSION: &str = "no file extension after the last path segment";
const NOT_A_FILE_NAME: &str = "sticker name is not a plain file name";

/// One concrete download unit: where to fetch from and where to store it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Link the bytes are fetched from.
    pub source_url: String,
    /// File the bytes are written to.
    pub local_path: PathBuf,
}

/// A catalog link that cannot be turned into a download target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparseableLink {
    /// Display name of the sticker the link belongs to.
    pub display_name: String,
    /// The offending link, verbatim.
    pub link: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Resolves every present link on `item` into a target under `pack_dir`.
///
/// Returns zero, one or two entries, static link first. Placeholder strings
/// that are not http(s) links, links without a derivable extension, and
/// sticker names that are not plain file names come back as
/// [`UnparseableLink`] and must not be fetched. Every returned target lies
/// directly inside `pack_dir`.
#[must_use]
pub fn resolve_targets(item: &Item, pack_dir: &Path) -> Vec<Result<DownloadTarget, UnparseableLink>> {
    item.links()
        .map(|link| resolve_link(&item.display_name, link, pack_dir))
        .collect()
}

fn resolve_link(
    display_name: &str,
    link: &str,
    pack_dir: &Path,
) -> Result<DownloadTarget, UnparseableLink> {
    let reject = |reason| UnparseableLink {
        display_name: display_name.to_string(),
        link: link.to_string(),
        reason,
    };

    if !has_http_scheme(link) {
        return Err(reject("not an http(s) link"));
    }
    let extension = extension_from_link(link).ok_or_else(|| reject(NO_EXTENSION))?;

    let file_name = format!("{display_name}{extension}");
    if !is_single_path_component(&file_name) {
        return Err(reject(NOT_A_FILE_NAME));
    }

    Ok(DownloadTarget {
        source_url: link.to_string(),
        local_path: pack_dir.join(file_name),
    })
}

fn has_http_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Returns the link suffix starting at its last `.`, if that dot sits after
/// the last `/`.
#[must_use]
pub fn extension_from_link(link: &str) -> Option<&str> {
    let dot = link.rfind('.')?;
    match link.rfind('/') {
        Some(slash) if slash > dot => None,
        _ => Some(&link[dot..]),
    }
}
