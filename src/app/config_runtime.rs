use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use sticker_core::catalog::DEFAULT_CATALOG_URL;
use sticker_core::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

use crate::app::config::{FileConfig, VerbositySetting};
use crate::cli::Args;

pub(crate) const DEFAULT_OUTPUT_DIR: &str = "stickers";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) output_dir: bool,
    pub(crate) catalog_url: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HttpTimeoutSettings {
    pub(crate) connect_secs: u64,
    pub(crate) read_secs: u64,
}

impl Default for HttpTimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// Effective settings after merging command line and config file.
#[derive(Debug)]
pub(crate) struct ResolvedSettings {
    pub(crate) args: Args,
    pub(crate) output_dir: PathBuf,
    pub(crate) catalog_url: String,
    pub(crate) http_timeouts: HttpTimeoutSettings,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let sources = CliValueSources {
        output_dir: is_commandline_value(&matches, "output_dir"),
        catalog_url: is_commandline_value(&matches, "catalog_url"),
        verbose: is_commandline_value(&matches, "verbose"),
        quiet: is_commandline_value(&matches, "quiet"),
    };
    (args, sources)
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills values the command line left open from the config file.
pub(crate) fn resolve_settings(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> ResolvedSettings {
    if let Some(file_config) = file_config {
        if !cli_sources.output_dir
            && args.output_dir.is_none()
            && let Some(output_dir) = &file_config.output_dir
        {
            args.output_dir = Some(output_dir.clone());
        }

        if !cli_sources.catalog_url
            && args.catalog_url.is_none()
            && let Some(catalog_url) = &file_config.catalog_url
        {
            args.catalog_url = Some(catalog_url.clone());
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut args, verbosity);
        }
    }

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let catalog_url = args
        .catalog_url
        .clone()
        .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());

    ResolvedSettings {
        args,
        output_dir,
        catalog_url,
        http_timeouts: resolve_http_timeouts(file_config),
    }
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

pub(crate) fn resolve_http_timeouts(file_config: Option<&FileConfig>) -> HttpTimeoutSettings {
    let mut settings = HttpTimeoutSettings::default();
    let Some(file_config) = file_config else {
        return settings;
    };

    if let Some(value) = file_config.connect_timeout_secs {
        settings.connect_secs = value;
    }
    if let Some(value) = file_config.read_timeout_secs {
        settings.read_secs = value;
    }
    settings
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}
