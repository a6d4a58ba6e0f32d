//! Strongly typed catalog entities.

use std::path::{Component, Path};

/// A named collection of stickers, stored under its own directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pack {
    /// Pack name; a single path component, used verbatim as the directory name.
    pub name: String,
    /// Stickers in catalog order.
    pub items: Vec<Item>,
}

/// One sticker with an optional static and an optional animated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Name used as the local file stem; a single path component.
    pub display_name: String,
    /// Static image link (`url` in the catalog).
    pub static_url: Option<String>,
    /// Animated image link (`gif_url` in the catalog).
    pub animated_url: Option<String>,
}

impl Item {
    /// Returns the links present on this item, static first.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.static_url
            .as_deref()
            .into_iter()
            .chain(self.animated_url.as_deref())
    }
}

/// Enumerates packs as `(index, name)` pairs for listing mode.
///
/// Indices are 1-based and are the values accepted by pack selection.
#[must_use]
pub fn list_packs(packs: &[Pack]) -> Vec<(usize, &str)> {
    packs
        .iter()
        .enumerate()
        .map(|(index, pack)| (index + 1, pack.name.as_str()))
        .collect()
}

/// Returns true when `name` joins onto a directory as exactly one entry.
///
/// Absolute paths, `.`, `..` and names containing a separator are rejected,
/// so a pack or sticker name can never point outside its parent directory.
#[must_use]
pub fn is_single_path_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Looks up a pack by the 1-based index printed by [`list_packs`].
#[must_use]
pub fn select_pack(packs: &[Pack], index: usize) -> Option<&Pack> {
    index.checked_sub(1).and_then(|i| packs.get(i))
}
