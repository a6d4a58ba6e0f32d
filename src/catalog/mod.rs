//! Sticker catalog: sources, decoding and the typed pack model.
//!
//! The catalog arrives as a loosely typed JSON document. It is decoded once,
//! at the boundary, into [`Pack`] and [`Item`] values; everything downstream
//! works on those types only.

mod error;
mod model;
mod parser;
mod source;

pub use error::CatalogError;
pub use model::{Item, Pack, is_single_path_component, list_packs, select_pack};
pub use parser::parse_catalog;
pub use source::{DEFAULT_CATALOG_URL, fetch_remote_catalog, load_catalog_file};
