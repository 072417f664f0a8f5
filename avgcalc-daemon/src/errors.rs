/// Error types for the avgcalc daemon
use thiserror::Error;

pub type Result<T, E = DaemonError> = core::result::Result<T, E>;

/// Failures that stop the daemon from starting or serving.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config: {0}")]
    Config(#[from] avgcalc_core::Error),
    #[error("http client: {0}")]
    Client(String),
}

/// Why an upstream fetch produced no batch.
///
/// Each variant is reported to the caller under its own status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream rejected the bearer token")]
    Unauthorized,
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("invalid upstream payload: {0}")]
    InvalidPayload(String),
    #[error("upstream transport: {0}")]
    Transport(String),
}

impl DaemonError {
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }
}

impl FetchError {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
