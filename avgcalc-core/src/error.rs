//! Error types for configuration loading.
//!
//! The window and average engine never fail; only the ambient configuration
//! layer produces errors.

use thiserror::Error;

/// Result alias defaulting to the core [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised while reading, parsing or validating configuration.
#[derive(Debug, Error)]
pub enum Error {
	/// Reading or writing a configuration file failed.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// The configuration file is not valid TOML for [`crate::AppConfig`].
	#[error("toml: {0}")]
	Toml(#[from] toml::de::Error),
	/// A value is present but unacceptable.
	#[error("config: {0}")]
	Config(String),
}

impl Error {
	/// Build a [`Error::Config`] from any message.
	pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }
}
