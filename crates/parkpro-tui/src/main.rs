//! `parkpro-tui`: terminal dashboard for a parking-lot operator.
//!
//! Three screens, reachable with number keys: Register (new arrivals and
//! the slot grid), Sessions (live board with time-out), and History
//! (billed transactions, delete, export and receipts).
//!
//! Logs go to a file (default `/tmp/parkpro-tui.log`) so they never
//! corrupt the terminal.

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

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use parkpro_config::{Profile, load_config_or_default, parse_base_url};
use parkpro_core::{Controller, StoreConfig, TlsVerification};

use crate::app::App;

/// Terminal dashboard for registering, timing out and auditing parked vehicles.
#[derive(Parser, Debug)]
#[command(name = "parkpro-tui", version, about)]
struct Cli {
    /// Profile from the shared config file
    #[arg(short = 'p', long, env = "PARKPRO_PROFILE")]
    profile: Option<String>,

    /// Transaction store base URL (overrides the profile)
    #[arg(short = 'u', long, env = "PARKPRO_STORE_URL")]
    store_url: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long, env = "PARKPRO_INSECURE")]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PARKPRO_TIMEOUT")]
    timeout: Option<u64>,

    /// Directory for exported reports and receipts
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Log file path
    #[arg(long, default_value = "/tmp/parkpro-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard must live until exit so buffered
/// lines get flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("parkpro_tui={level},parkpro_core={level}"))
    });

    let log_dir = cli.log_file.parent().unwrap_or(Path::new("/tmp"));
    let log_name = cli
        .log_file
        .file_name()
        .unwrap_or(OsStr::new("parkpro-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Flags beat the profile, the profile beats built-in defaults.
fn resolve_store_config(cli: &Cli) -> Result<StoreConfig> {
    let cfg = load_config_or_default();
    let name = cfg.active_profile_name(cli.profile.as_deref());

    let profile = match cfg.profile(name) {
        Ok(profile) => profile,
        Err(_) if cli.store_url.is_some() => Profile::default(),
        Err(e) => return Err(eyre!(e)),
    };

    let mut store = parkpro_config::profile_to_store_config(&profile, &cfg.defaults)?;
    if let Some(raw) = &cli.store_url {
        store.base_url = parse_base_url(raw)?;
    }
    if cli.insecure {
        store.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = cli.timeout {
        store.timeout = Some(Duration::from_secs(secs));
    }
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so a panic during setup still restores the terminal.
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let store = resolve_store_config(&cli)?;
    info!(base_url = %store.base_url, export_dir = %cli.export_dir.display(), "starting parkpro-tui");

    let controller = Controller::new(store)?;
    App::new(controller, cli.export_dir).run().await
}
