pub mod exchangerate_api;
pub mod fallback;
pub mod open_er;
pub mod resolver;

use anyhow::Result;
use std::time::Duration;

use crate::core::rate::{RateMap, SourceError};

/// Upstream calls share one policy: a fixed timeout and no redirects
/// beyond reqwest defaults. A hung request is bounded only by this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("cambio/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// A parsed table must be non-empty and all-positive before a source
/// may return it; anything else counts as a malformed payload and the
/// resolver moves on to the next source.
pub(crate) fn validate_rates(rates: RateMap) -> Result<RateMap, SourceError> {
    if rates.is_empty() {
        return Err(SourceError::Malformed("empty rate table".into()));
    }
    if let Some((code, rate)) = rates.iter().find(|(_, rate)| **rate <= 0.0) {
        return Err(SourceError::Malformed(format!(
            "non-positive rate {rate} for {code}"
        )));
    }
    Ok(rates)
}
