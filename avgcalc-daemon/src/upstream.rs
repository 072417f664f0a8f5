//! Upstream number source.
//!
//! The HTTP implementation talks to the external test server; handlers only
//! see the [`NumberSource`] trait so tests can substitute a canned source.

#![forbid(unsafe_code)]

use async_trait::async_trait;
use avgcalc_core::{AppConfig, Number, NumberKind};
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::errors::{DaemonError, FetchError};

/// Something that yields a batch of numbers for a kind.
#[async_trait]
pub trait NumberSource: Send + Sync {
    /// Fetch one batch. A returned batch has already been validated.
    async fn fetch(&self, kind: NumberKind) -> Result<Vec<Number>, FetchError>;
}

/// Bearer-authenticated reqwest client for the upstream test server.
#[derive(Clone)]
pub struct HttpNumberSource {
    client: reqwest::Client,
    cfg: AppConfig,
}

impl HttpNumberSource {
    pub fn new(cfg: &AppConfig) -> Result<Self, DaemonError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .no_proxy()
            .build()
            .map_err(|e| DaemonError::client(e.to_string()))?;
        Ok(Self { client, cfg: cfg.clone() })
    }
}

#[async_trait]
impl NumberSource for HttpNumberSource {
    async fn fetch(&self, kind: NumberKind) -> Result<Vec<Number>, FetchError> {
        let url = self.cfg.endpoint(kind);
        debug!(%url, timeout_ms = self.cfg.timeout_ms, "fetching upstream batch");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.cfg.auth_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        match resp.status().as_u16() {
            200 => {}
            401 => return Err(FetchError::Unauthorized),
            other => return Err(FetchError::Status(other)),
        }

        let body = resp.bytes().await.map_err(classify)?;
        parse_payload(&body)
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::transport(e.to_string())
    }
}

/// Extract the `numbers` array from an upstream body.
///
/// Every element must be a finite JSON number; anything else rejects the
/// whole batch so the window is never touched by a partial payload.
pub fn parse_payload(body: &[u8]) -> Result<Vec<Number>, FetchError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::invalid_payload(format!("body is not JSON: {e}")))?;
    let items = value
        .get("numbers")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::invalid_payload("missing `numbers` array"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .and_then(Number::new)
                .ok_or_else(|| FetchError::invalid_payload(format!("numbers[{i}] is not a number")))
        })
        .collect()
}
