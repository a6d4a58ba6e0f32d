//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download every sticker pack of a catalog into local folders.
///
/// Each pack becomes `<output-dir>/<pack name>/`, each sticker one file per
/// variant (static and animated). Files that already exist are skipped, so
/// the command can be rerun to fill gaps.
#[derive(Parser, Debug)]
#[command(name = "sticker-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Session token for the catalog API (falls back to $SESSDATA)
    #[arg(long, value_name = "TOKEN")]
    pub sessdata: Option<String>,

    /// Read the catalog from a local JSON file instead of the API
    #[arg(long, value_name = "PATH", conflicts_with = "catalog_url")]
    pub catalog_file: Option<PathBuf>,

    /// Catalog endpoint to fetch from
    #[arg(long, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// Directory the pack folders are created in [default: stickers]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the packs in the catalog with their numbers and exit
    #[arg(long, conflicts_with = "pack")]
    pub list: bool,

    /// Download only the pack with this number (as shown by --list)
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub pack: Option<u32>,

    /// Disable the live progress display
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
