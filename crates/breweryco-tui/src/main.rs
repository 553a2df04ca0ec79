//! `breweryco`: terminal browser for the Open Brewery DB brewery list.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive state from
//! `breweryco-core`'s [`BreweriesViewModel`](breweryco_core::BreweriesViewModel).
//! The list pages in as the selection nears the end; Enter opens the
//! details view for the selected brewery.
//!
//! Logs are written to a file (default `/tmp/breweryco.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use breweryco_config::Config;
use breweryco_core::Services;

use crate::app::App;

/// Browse breweries from Open Brewery DB in the terminal.
#[derive(Parser, Debug)]
#[command(name = "breweryco", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// API base URL (e.g., https://api.openbrewerydb.org)
    #[arg(short = 'u', long)]
    base_url: Option<String>,

    /// Breweries requested per page (1-200)
    #[arg(short = 'p', long)]
    page_size: Option<u32>,

    /// Disable the background reachability probe
    #[arg(long)]
    no_probe: bool,

    /// Write the effective config to the config file and exit
    #[arg(long)]
    write_config: bool,

    /// Log file path (defaults to /tmp/breweryco.log)
    #[arg(long, default_value = "/tmp/breweryco.log", env = "BREWERYCO_LOG_FILE")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may log to stdout/stderr while the
/// TUI owns the terminal. The returned guard flushes logs on drop.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "breweryco={log_level},breweryco_core={log_level},breweryco_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("breweryco.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Load the layered config, then apply command-line overrides on top.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(breweryco_config::config_path);
    let mut cfg = breweryco_config::load_config_from(&path)
        .wrap_err_with(|| format!("failed to load {}", path.display()))?;

    if let Some(url) = &cli.base_url {
        cfg.api.base_url.clone_from(url);
    }
    if let Some(size) = cli.page_size {
        cfg.paging.page_size = size;
    }
    if cli.no_probe {
        cfg.connectivity.probe_enabled = false;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = resolve_config(&cli)?;
    let brewery_config = cfg.to_brewery_config()?;

    if cli.write_config {
        let path = cli.config.clone().unwrap_or_else(breweryco_config::config_path);
        breweryco_config::save_config_to(&cfg, &path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    info!(
        base_url = %brewery_config.base_url,
        page_size = brewery_config.paging.page_size,
        probe = brewery_config.probe.is_some(),
        "starting breweryco"
    );

    let services = Services::new(brewery_config)?;
    services.start();

    let mut app = App::new(&services);
    let result = app.run().await;

    services.shutdown();
    result
}
