//! Exchange rate abstractions

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One currency pair entry of the upstream response.
///
/// Only `bid` is required, the rest is informational.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Quote {
    pub bid: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub codein: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub high: Option<String>,
    #[serde(default)]
    pub low: Option<String>,
    #[serde(default)]
    pub ask: Option<String>,
    #[serde(default)]
    pub create_date: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build upstream request: {0}")]
    Request(#[source] reqwest::Error),

    /// Connection failures and elapsed deadlines.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("upstream response has no {0} quote")]
    MissingQuote(String),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the current quote. Each call hits the upstream once.
    async fn fetch_quote(&self) -> Result<Quote, FetchError>;
}
