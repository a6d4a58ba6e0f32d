//! Decoding of the sticker panel document into [`Pack`]s.
//!
//! The panel document looks like:
//!
//! ```text
//! { "data": { "all_packages": [
//!     { "text": "Pack A", "emote": [
//!         { "text": "smile", "url": "https://…/a.png", "gif_url": "https://…/a.gif" }
//!     ] }
//! ] } }
//! ```
//!
//! Shape problems at the catalog or pack level abort with
//! [`CatalogError::MalformedSchema`]. A malformed item is logged and skipped;
//! its siblings are kept. Pack and sticker names become path entries, so a
//! name that is not exactly one path component counts as malformed.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::error::CatalogError;
use super::model::{Item, Pack, is_single_path_component};

#[derive(Debug, Deserialize)]
struct RawPanel {
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    all_packages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawPack {
    text: String,
    emote: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    text: String,
    url: Option<String>,
    gif_url: Option<String>,
}

/// Decodes an already-parsed panel document into packs.
///
/// # Errors
///
/// Returns [`CatalogError::MalformedSchema`] when `data.all_packages` is
/// missing or not a list, or when a pack lacks a non-empty string `text`
/// or a list `emote`, or when a pack name is absolute, contains a path
/// separator or is `.`/`..`. An empty `emote` list is valid.
#[instrument(skip(document))]
pub fn parse_catalog(document: &Value) -> Result<Vec<Pack>, CatalogError> {
    let panel = RawPanel::deserialize(document)
        .map_err(|e| CatalogError::malformed("data.all_packages", e.to_string()))?;

    let mut packs = Vec::with_capacity(panel.data.all_packages.len());
    let mut skipped_items = 0usize;

    for (pack_index, raw) in panel.data.all_packages.iter().enumerate() {
        let location = format!("data.all_packages[{pack_index}]");
        let raw_pack = RawPack::deserialize(raw)
            .map_err(|e| CatalogError::malformed(location.clone(), e.to_string()))?;

        if raw_pack.text.trim().is_empty() {
            return Err(CatalogError::malformed(
                format!("{location}.text"),
                "pack name is empty",
            ));
        }
        if !is_single_path_component(&raw_pack.text) {
            return Err(CatalogError::malformed(
                format!("{location}.text"),
                format!("pack name {:?} is not a single directory name", raw_pack.text),
            ));
        }

        let mut items = Vec::with_capacity(raw_pack.emote.len());
        for (item_index, raw_item) in raw_pack.emote.iter().enumerate() {
            match decode_item(raw_item) {
                Ok(item) => items.push(item),
                Err(reason) => {
                    skipped_items += 1;
                    warn!(
                        pack = %raw_pack.text,
                        location = %format!("{location}.emote[{item_index}]"),
                        %reason,
                        "skipping malformed sticker entry"
                    );
                }
            }
        }

        debug!(pack = %raw_pack.text, items = items.len(), "decoded pack");
        packs.push(Pack {
            name: raw_pack.text,
            items,
        });
    }

    debug!(packs = packs.len(), skipped_items, "catalog decoded");
    Ok(packs)
}

fn decode_item(raw: &Value) -> Result<Item, String> {
    let item = RawItem::deserialize(raw).map_err(|e| e.to_string())?;
    if item.text.is_empty() {
        return Err("sticker name is empty".to_string());
    }
    if !is_single_path_component(&item.text) {
        return Err(format!("sticker name {:?} is not a single file name", item.text));
    }
    Ok(Item {
        display_name: item.text,
        static_url: item.url,
        animated_url: item.gif_url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_single_pack_single_item() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "Pack A", "emote": [ { "text": "smile", "url": "https://x/a.png" } ] }
            ] }
        });

        let packs = parse_catalog(&document).unwrap();

        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].name, "Pack A");
        assert_eq!(
            packs[0].items,
            vec![Item {
                display_name: "smile".to_string(),
                static_url: Some("https://x/a.png".to_string()),
                animated_url: None,
            }]
        );
    }

    #[test]
    fn test_parse_keeps_both_variants() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "P", "emote": [
                    { "text": "wave", "url": "https://x/w.png", "gif_url": "https://x/w.gif" }
                ] }
            ] }
        });

        let packs = parse_catalog(&document).unwrap();
        let item = &packs[0].items[0];
        assert_eq!(item.static_url.as_deref(), Some("https://x/w.png"));
        assert_eq!(item.animated_url.as_deref(), Some("https://x/w.gif"));
    }

    #[test]
    fn test_parse_empty_emote_list_is_valid() {
        let document = json!({ "data": { "all_packages": [ { "text": "Empty", "emote": [] } ] } });
        let packs = parse_catalog(&document).unwrap();
        assert_eq!(packs.len(), 1);
        assert!(packs[0].items.is_empty());
    }

    #[test]
    fn test_parse_null_links_are_absent() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "P", "emote": [ { "text": "x", "url": null, "gif_url": null } ] }
            ] }
        });
        let packs = parse_catalog(&document).unwrap();
        assert_eq!(packs[0].items[0].links().count(), 0);
    }

    #[test]
    fn test_parse_missing_data_is_malformed() {
        let document = json!({ "code": -101, "message": "not logged in" });
        let result = parse_catalog(&document);
        assert!(matches!(result, Err(CatalogError::MalformedSchema { .. })));
    }

    #[test]
    fn test_parse_null_data_is_malformed() {
        let document = json!({ "data": null });
        assert!(matches!(
            parse_catalog(&document),
            Err(CatalogError::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_parse_pack_without_emote_list_is_malformed() {
        let document = json!({ "data": { "all_packages": [ { "text": "P", "emote": "nope" } ] } });
        let err = parse_catalog(&document).unwrap_err();
        match err {
            CatalogError::MalformedSchema { location, .. } => {
                assert_eq!(location, "data.all_packages[0]");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_pack_with_empty_name_is_malformed() {
        let document = json!({ "data": { "all_packages": [ { "text": "  ", "emote": [] } ] } });
        assert!(matches!(
            parse_catalog(&document),
            Err(CatalogError::MalformedSchema { .. })
        ));
    }

    #[test]
    fn test_parse_skips_malformed_item_and_keeps_siblings() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "P", "emote": [
                    { "text": "good", "url": "https://x/g.png" },
                    "not an object",
                    { "url": "https://x/no-name.png" },
                    { "text": "bad-url", "url": 42 },
                    { "text": "also-good", "gif_url": "https://x/a.gif" }
                ] }
            ] }
        });

        let packs = parse_catalog(&document).unwrap();
        let names: Vec<&str> = packs[0]
            .items
            .iter()
            .map(|item| item.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["good", "also-good"]);
    }

    #[test]
    fn test_parse_preserves_pack_order() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "first", "emote": [] },
                { "text": "second", "emote": [] },
                { "text": "third", "emote": [] }
            ] }
        });
        let packs = parse_catalog(&document).unwrap();
        let names: Vec<&str> = packs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_parse_pack_name_leaving_output_dir_is_malformed() {
        for name in ["/abs", "../x", "a/b", ".."] {
            let document = json!({ "data": { "all_packages": [ { "text": name, "emote": [] } ] } });
            match parse_catalog(&document) {
                Err(CatalogError::MalformedSchema { location, .. }) => {
                    assert_eq!(location, "data.all_packages[0].text");
                }
                other => panic!("{name:?} was not rejected: {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_skips_items_whose_name_is_a_path() {
        let document = json!({
            "data": { "all_packages": [
                { "text": "P", "emote": [
                    { "text": "/tmp/evil", "url": "https://x/e.png" },
                    { "text": "../up", "url": "https://x/u.png" },
                    { "text": "a/b", "url": "https://x/n.png" },
                    { "text": "fine", "url": "https://x/f.png" }
                ] }
            ] }
        });

        let packs = parse_catalog(&document).unwrap();
        let names: Vec<&str> = packs[0]
            .items
            .iter()
            .map(|item| item.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["fine"]);
    }
}
