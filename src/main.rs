//! Entry point for the viewport engine replay tool.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load engine configuration from `conf/config.toml` (or `--config`).
//! - Load the page description and replay its script through the engine.
//! - Print the final state.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};
use viewport_engine::cancellation::CancellationToken;
use viewport_engine::config::load_config;
use viewport_engine::page::load_page;
use viewport_engine::runner::{RunReport, replay};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

struct Args {
    page: PathBuf,
    config: PathBuf,
    json: bool,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(&args.config);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        page = %args.page.display(),
        level = %config.log_level,
        margin_px = config.activation_margin_px,
        threshold_px = config.scroll_top_threshold_px,
        debounce_ms = config.scroll_debounce_ms,
        "Starting viewport engine replay"
    );

    let fixture = load_page(&args.page)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || on_interrupt.cancel()) {
        warn!("Failed to install Ctrl-C handler: {err}");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to build the event loop runtime")?;
    let report = runtime.block_on(replay(fixture, config, cancel))?;

    print_report(&report, args.json)
}

fn parse_args() -> Result<Args> {
    let usage = || anyhow!("Usage: viewport-engine <page.toml> [--config <path>] [--json]");
    let mut page = None;
    let mut config = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut json = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => {
                config = args.next().map(PathBuf::from).ok_or_else(usage)?;
            }
            _ if page.is_none() && !arg.starts_with("--") => page = Some(PathBuf::from(&arg)),
            _ => return Err(usage()),
        }
    }

    let page = page.ok_or_else(usage)?;
    if !page.exists() {
        return Err(anyhow!("File not found: {}", page.display()));
    }
    Ok(Args { page, config, json })
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize replay report")?;
        println!("{rendered}");
        return Ok(());
    }

    let snapshot = &report.snapshot;
    println!("scroll offset:   {:.0}px", snapshot.scroll_offset);
    println!(
        "active section:  {}",
        snapshot
            .active_section
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or("(none)")
    );
    println!(
        "active links:    {}",
        snapshot
            .active_links
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("scroll-to-top:   {:?}", snapshot.scroll_top);
    println!(
        "images:          {} loaded, {} pending (lazy loading {})",
        snapshot.loaded_images.len(),
        snapshot.pending_images.len(),
        if snapshot.lazy_loading { "on" } else { "off" }
    );
    println!(
        "mutations:       {} ({} notifications{})",
        report.mutations,
        report.notifications,
        if report.cancelled { ", cancelled" } else { "" }
    );
    Ok(())
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
