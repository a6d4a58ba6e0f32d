use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use sticker_core::auth::{SESSION_ENV_VAR, SessionToken, resolve_session_token, session_cookie_jar};
use sticker_core::catalog::{
    Pack, fetch_remote_catalog, list_packs, load_catalog_file, parse_catalog, select_pack,
};
use sticker_core::download::{DownloadEngine, DownloadError, HttpClient, RetryPolicy};
use sticker_core::progress::{ChannelReporter, LogReporter, ProgressEvent, ProgressReporter};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::config_runtime::ResolvedSettings;
use crate::app::{config, config_runtime, exit_handler, progress_manager, terminal};

pub(crate) async fn run_downloader() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let file_config = config::load_default_file_config()?;
    let settings = config_runtime::resolve_settings(args, &cli_sources, file_config.as_ref());

    let use_live_display = !settings.args.list
        && terminal::should_use_live_display(
            io::stderr().is_terminal(),
            settings.args.quiet,
            settings.args.no_progress,
            terminal::is_dumb_terminal(),
        );

    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    // The live display shows per-asset results itself; keep the log to warnings.
    let default_level = if use_live_display && !force_cli_log_level {
        "warn"
    } else {
        config_runtime::resolve_default_log_level(&settings.args)
    };
    let no_color = terminal::is_no_color_requested(&settings.args);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(
        output_dir = %settings.output_dir.display(),
        catalog_file = ?settings.args.catalog_file,
        catalog_url = %settings.catalog_url,
        pack = ?settings.args.pack,
        config_file = file_config.is_some(),
        "settings resolved"
    );
    info!("Sticker downloader starting");

    if settings.args.list {
        return run_list(&settings).await;
    }

    let started = Instant::now();
    let interrupted = spawn_interrupt_listener();

    let (reporter, display): (Arc<dyn ProgressReporter>, _) = if use_live_display {
        let (reporter, events) = ChannelReporter::channel();
        let display = progress_manager::spawn_progress_ui(events, Arc::clone(&interrupted));
        (Arc::new(reporter), Some(display))
    } else {
        (Arc::new(LogReporter), None)
    };

    let outcome = run_download(&settings, Arc::clone(&reporter), &interrupted, started).await;

    // Closing the last sender lets the display finish.
    drop(reporter);
    if let Some(display) = display {
        let _ = display.await;
    }

    outcome
}

async fn run_list(settings: &ResolvedSettings) -> Result<ProcessExit> {
    let (document, _client) = load_catalog(settings).await?;
    let packs = parse_catalog(&document)?;

    let mut stdout = io::stdout().lock();
    for (index, name) in list_packs(&packs) {
        writeln!(stdout, "{index:>3}. {name}")?;
    }
    Ok(ProcessExit::Success)
}

async fn run_download(
    settings: &ResolvedSettings,
    reporter: Arc<dyn ProgressReporter>,
    interrupted: &Arc<AtomicBool>,
    started: Instant,
) -> Result<ProcessExit> {
    let (packs, client) = match prepare_packs(settings).await {
        Ok(prepared) => prepared,
        Err(error) => {
            reporter.report(ProgressEvent::fatal(format!("{error:#}"), started.elapsed()));
            return Ok(ProcessExit::Failure);
        }
    };

    let engine = DownloadEngine::new(
        Arc::new(client),
        RetryPolicy::default(),
        reporter,
        settings.output_dir.clone(),
    )
    .with_interrupt_flag(Arc::clone(interrupted));

    let stats = match settings.args.pack {
        Some(number) => {
            let index = usize::try_from(number).unwrap_or(usize::MAX);
            // Checked in prepare_packs.
            let Some(pack) = select_pack(&packs, index) else {
                return Ok(ProcessExit::Failure);
            };
            engine.download_pack(pack).await
        }
        None => engine.download_all(&packs).await,
    };

    let exit = exit_handler::determine_exit_outcome(&stats, interrupted.load(Ordering::SeqCst));
    if exit == ProcessExit::Aborted {
        warn!(
            succeeded = stats.succeeded(),
            skipped = stats.skipped(),
            "Interrupted. Run again to fetch what is missing."
        );
    } else {
        info!(
            output_dir = %settings.output_dir.display(),
            succeeded = stats.succeeded(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            unparseable = stats.unparseable(),
            retried = stats.retried(),
            "Download complete"
        );
    }
    Ok(exit)
}

/// Loads and parses the catalog and checks the pack selection.
async fn prepare_packs(settings: &ResolvedSettings) -> Result<(Vec<Pack>, HttpClient)> {
    let (document, client) = load_catalog(settings).await?;
    let packs = parse_catalog(&document)?;
    info!(packs = packs.len(), "catalog loaded");

    if let Some(number) = settings.args.pack {
        let index = usize::try_from(number).unwrap_or(usize::MAX);
        if select_pack(&packs, index).is_none() {
            return Err(anyhow!(
                "there is no pack number {number}; the catalog has {} packs (see --list)",
                packs.len()
            ));
        }
    }
    Ok((packs, client))
}

/// Loads the catalog document and builds the client used for the assets.
///
/// A session token is only required when the catalog comes from the API;
/// its absence fails before any request is made.
async fn load_catalog(settings: &ResolvedSettings) -> Result<(Value, HttpClient)> {
    if let Some(path) = &settings.args.catalog_file {
        info!(path = %path.display(), "reading catalog from file");
        let client = build_client(settings, None)?;
        let document = load_catalog_file(path).await?;
        return Ok((document, client));
    }

    let env_token = std::env::var(SESSION_ENV_VAR).ok();
    let token = resolve_session_token(settings.args.sessdata.as_deref(), env_token.as_deref())?;
    let client = build_client(settings, Some(&token))?;

    info!(url = %settings.catalog_url, "fetching catalog");
    let document = fetch_remote_catalog(&client, &settings.catalog_url)
        .await
        .context("could not get the sticker catalog")?;
    Ok((document, client))
}

fn build_client(
    settings: &ResolvedSettings,
    token: Option<&SessionToken>,
) -> Result<HttpClient, DownloadError> {
    let timeouts = settings.http_timeouts;
    match token {
        Some(token) => HttpClient::with_cookie_jar_and_timeouts(
            session_cookie_jar(token),
            timeouts.connect_secs,
            timeouts.read_secs,
        ),
        None => HttpClient::new_with_timeouts(timeouts.connect_secs, timeouts.read_secs),
    }
}

/// Sets the returned flag on the first Ctrl-C; a second one exits at once.
fn spawn_interrupt_listener() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
            warn!("Interrupt received, letting running downloads finish (Ctrl-C again to quit now)");
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(i32::from(ProcessExit::Aborted.code()));
            }
        }
    });
    interrupted
}
