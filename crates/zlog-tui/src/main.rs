//! `zlog-tui` — Live terminal dashboard for ZLog request logs.
//!
//! Built on [ratatui](https://ratatui.rs) over the `zlog-core` sync engine.
//! The left column lists projects, the selected project's stats cards, and
//! integration snippets; the right column tails the project's logs with a
//! debounced text filter.
//!
//! Logs are written to a file (default `/tmp/zlog-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod clipboard;
mod component;
mod data_bridge;
mod event;
mod panels;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use zlog_core::Dashboard;

use crate::app::App;

/// Terminal dashboard for tailing ZLog request logs.
#[derive(Parser, Debug)]
#[command(name = "zlog-tui", version, about)]
struct Cli {
    /// Backend URL (e.g., http://localhost:8000). Overrides the config file.
    #[arg(short = 'u', long, env = "ZLOG_BACKEND_URL")]
    url: Option<String>,

    /// Poll interval for logs and stats (e.g., "5s", "1500ms")
    #[arg(short = 'i', long, value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Config file (defaults to the platform config dir)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log file path (defaults to /tmp/zlog-tui.log)
    #[arg(long, default_value = "/tmp/zlog-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may be written to stdout/stderr while
/// the TUI owns the terminal. The returned guard must be held for the
/// lifetime of the application so buffered logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "zlog_tui={log_level},zlog_core={log_level},zlog_api={log_level}"
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
        .unwrap_or(std::ffi::OsStr::new("zlog-tui.log"));

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

/// Resolve the dashboard config. Priority: CLI flags > env > file > defaults.
fn build_dashboard(cli: &Cli) -> Result<Dashboard> {
    let mut cfg = match &cli.config {
        Some(path) => zlog_config::load_config_from(path),
        None => zlog_config::load_config(),
    }
    .wrap_err("failed to load configuration")?;

    if let Some(url) = &cli.url {
        cfg.base_url.clone_from(url);
    }
    if let Some(interval) = cli.interval {
        cfg.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
    }

    let dashboard_config = cfg
        .to_dashboard_config()
        .wrap_err("invalid configuration")?;
    Ok(Dashboard::connect(dashboard_config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let dashboard = build_dashboard(&cli)?;
    info!(
        url = %dashboard.config().base_url,
        interval = %humantime::format_duration(dashboard.config().poll_interval),
        "starting zlog-tui"
    );

    let mut app = App::new(dashboard);
    app.run().await?;

    Ok(())
}
