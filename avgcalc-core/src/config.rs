use crate::error::{Error, Result};
use crate::types::{NumberKind, DEFAULT_WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use std::{fs, net::SocketAddr, path::Path, time::Duration};

/// Service configuration, built once at startup and handed to collaborators.
///
/// Missing TOML keys fall back to [`AppConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Address the HTTP server binds to.
	pub listen_addr: String,
	/// Base URL of the upstream number service, without the kind path.
	pub base_url: String,
	/// Bearer token sent to upstream.
	pub auth_token: String,
	/// Window capacity.
	pub window_size: usize,
	/// Per-request upstream timeout in milliseconds.
	pub timeout_ms: u64,
	/// Tracing level used when `RUST_LOG` is unset.
	pub log_level: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			listen_addr: "0.0.0.0:9876".into(),
			base_url: "http://localhost:9877/test".into(),
			auth_token: String::new(),
			window_size: DEFAULT_WINDOW_SIZE,
			timeout_ms: 500,
			log_level: "info".into(),
		}
	}
}

impl AppConfig {
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
		let data = fs::read_to_string(path)?;
		let cfg: Self = toml::from_str(&data)?;
		cfg.validate()?;
		Ok(cfg)
	}

	pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
		let s = toml::to_string_pretty(self).map_err(|e| Error::config(format!("toml encode error: {e}")))?;
		fs::write(path, s)?;
		Ok(())
	}

	pub fn from_env() -> Result<Self> {
		let mut cfg = Self::default();
		cfg.apply_env()?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Overlay `AVGCALC_*` environment variables onto `self`.
	pub fn apply_env(&mut self) -> Result<()> {
		if let Ok(v) = std::env::var("AVGCALC_LISTEN_ADDR") {
			self.listen_addr = v;
		} else if let Ok(port) = std::env::var("PORT") {
			let port: u16 = port.trim().parse().map_err(|_| Error::config(format!("invalid PORT: {port}")))?;
			self.listen_addr = format!("0.0.0.0:{port}");
		}
		if let Ok(v) = std::env::var("AVGCALC_BASE_URL") { self.base_url = v; }
		if let Ok(v) = std::env::var("AVGCALC_AUTH_TOKEN") { self.auth_token = v.trim().to_string(); }
		if let Ok(v) = std::env::var("AVGCALC_WINDOW_SIZE") {
			self.window_size = v.trim().parse().map_err(|_| Error::config(format!("invalid AVGCALC_WINDOW_SIZE: {v}")))?;
		}
		if let Ok(v) = std::env::var("AVGCALC_TIMEOUT_MS") {
			self.timeout_ms = v.trim().parse().map_err(|_| Error::config(format!("invalid AVGCALC_TIMEOUT_MS: {v}")))?;
		}
		if let Ok(v) = std::env::var("AVGCALC_LOG_LEVEL") { self.log_level = v; }
		Ok(())
	}

	pub fn validate(&self) -> Result<()> {
		let allowed = ["trace", "debug", "info", "warn", "error"];
		if !allowed.contains(&self.log_level.as_str()) {
			return Err(Error::config(format!("invalid log_level: {}", self.log_level)));
		}
		self.socket_addr()?;
		// The upstream client is built without TLS.
		if !self.base_url.starts_with("http://") {
			return Err(Error::config(format!("base_url must be http://: {}", self.base_url)));
		}
		if !(1..=60_000).contains(&self.timeout_ms) {
			return Err(Error::config("timeout_ms must be 1..=60000"));
		}
		Ok(())
	}

	pub fn socket_addr(&self) -> Result<SocketAddr> {
		self.listen_addr.parse().map_err(|_| Error::config(format!("invalid listen_addr: {}", self.listen_addr)))
	}

	pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

	/// Full upstream URL serving `kind`.
	pub fn endpoint(&self, kind: NumberKind) -> String {
		format!("{}/{}", self.base_url.trim_end_matches('/'), kind.upstream_path())
	}
}
