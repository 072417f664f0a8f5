#![forbid(unsafe_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use avgcalc_core::{AppConfig, WindowStore};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::errors::Result;
use crate::numbers_api::create_numbers_router;
use crate::upstream::{HttpNumberSource, NumberSource};

/// Defaults, then the TOML file when given, then `AVGCALC_*` variables.
pub fn resolve_config(file: Option<&Path>) -> Result<AppConfig> {
    let mut cfg = match file {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };
    cfg.apply_env()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Install the fmt subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

/// Router wired to a fresh window and the real upstream client.
pub fn build_app(cfg: &AppConfig) -> Result<(Router, Arc<WindowStore>)> {
    let window = Arc::new(WindowStore::new(cfg.window_size));
    let source: Arc<dyn NumberSource> = Arc::new(HttpNumberSource::new(cfg)?);
    Ok((create_numbers_router(window.clone(), source), window))
}

/// Bind `cfg.listen_addr` and serve until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let (app, _window) = build_app(&cfg)?;
    let listener = TcpListener::bind(cfg.socket_addr()?).await?;
    info!(
        addr = %listener.local_addr()?,
        window_size = cfg.window_size,
        upstream = %cfg.base_url,
        "avgcalc listening"
    );
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("avgcalc stopped");
    Ok(())
}

/// Serve on a background task; returns the handle and the bound address.
pub async fn spawn(cfg: AppConfig) -> Result<(JoinHandle<()>, SocketAddr)> {
    let (app, _window) = build_app(&cfg)?;
    let listener = TcpListener::bind(cfg.socket_addr()?).await?;
    let local = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("server error: {e}");
        }
    });
    Ok((handle, local))
}
