//! Arbor Daemon - Main entry point
//!
//! Serves the device registry and network topology over HTTP.

mod api;
mod config;
mod server;
mod state;
mod validate;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(about = "Network device registry and topology service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "arbor.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", config::sample_config()?);
        return Ok(());
    }

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Arbor v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    info!(
        bind = %config.daemon.bind,
        snapshot = config.storage.snapshot_path.as_deref().unwrap_or("-"),
        seeds = config.seed_devices.len(),
        "Configuration loaded"
    );

    let state = state::AppState::new(config.clone())?;

    server::run(state, &config.daemon.bind).await
}
