//! Arena daemon — entry point for running an arena backend node.

use arena_node::{init_logging, ArenaConfig, ArenaNode, LogFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arena-daemon", about = "Wagering arena backend daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long, env = "ARENA_CONFIG")]
    config: Option<PathBuf>,

    /// Store snapshot path.
    #[arg(long, env = "ARENA_SNAPSHOT_PATH")]
    snapshot_path: Option<PathBuf>,

    /// Seconds between auto-resolution sweeps.
    #[arg(long, env = "ARENA_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ARENA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ARENA_LOG_FORMAT")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ArenaConfig::from_toml_file(&path.display().to_string())?,
        None => ArenaConfig::default(),
    };
    if let Some(path) = cli.snapshot_path {
        config.snapshot_path = path;
    }
    if let Some(interval) = cli.sweep_interval_secs {
        config.params.sweep_interval_secs = interval;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    init_logging(
        LogFormat::from_config(&config.log_format),
        &config.log_level,
    );
    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        sweep_interval_secs = config.params.sweep_interval_secs,
        "starting arena node"
    );

    let node = ArenaNode::new(config)?;
    node.start();
    node.shutdown.wait_for_signal().await;
    node.stop().await?;
    tracing::info!("arena node stopped");
    Ok(())
}
