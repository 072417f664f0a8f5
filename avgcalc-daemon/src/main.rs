#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use avgcalc_daemon::server::{init_tracing, resolve_config, run};

#[derive(Debug, Parser)]
#[command(name = "avgcalc-daemon", version, about = "Sliding-window average over upstream number feeds")]
struct Cli {
	/// TOML configuration file. Falls back to AVGCALC_CONFIG.
	#[arg(long)]
	config: Option<PathBuf>,
	/// Listen address, e.g. 0.0.0.0:9876
	#[arg(long)]
	listen: Option<String>,
	/// Window capacity
	#[arg(long)]
	window_size: Option<usize>,
	/// Upstream timeout in milliseconds
	#[arg(long)]
	timeout_ms: Option<u64>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let config_path = cli.config.or_else(|| std::env::var("AVGCALC_CONFIG").ok().map(PathBuf::from));
	let mut cfg = resolve_config(config_path.as_deref()).context("loading configuration")?;
	if let Some(addr) = cli.listen { cfg.listen_addr = addr; }
	if let Some(n) = cli.window_size { cfg.window_size = n; }
	if let Some(ms) = cli.timeout_ms { cfg.timeout_ms = ms; }
	cfg.validate().context("validating command line overrides")?;

	init_tracing(&cfg.log_level);
	if cfg.auth_token.is_empty() {
		warn!("AVGCALC_AUTH_TOKEN is empty; upstream will likely answer 401");
	}
	if let Some(path) = &config_path {
		info!("configuration loaded from {}", path.display());
	}

	run(cfg, async {
		tokio::signal::ctrl_c().await.ok();
		info!("ctrl-c received, shutting down");
	})
	.await?;
	Ok(())
}
