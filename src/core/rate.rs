//! Exchange rate data model and the upstream source abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Currency code mapped to its rate against some base currency.
pub type RateMap = HashMap<String, f64>;

/// A single exchange rate quote. Immutable once created; `rate` is
/// always positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

/// Failure of a single upstream source. The resolver treats every
/// variant the same way: log and move on to the next source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

/// A single upstream rate endpoint. Each call is exactly one attempt;
/// retry policy, if any, belongs to the caller.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn fetch_rates(&self, base: &str) -> Result<RateMap, SourceError>;
}
