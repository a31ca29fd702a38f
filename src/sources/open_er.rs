use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, validate_rates};
use crate::core::rate::{RateMap, RateSource, SourceError};

/// Keyless source in the open.er-api.com / exchangerate-api.com v4
/// family. `GET {base_url}/{base}` returns the rate table under either
/// a `rates` or a `conversion_rates` key depending on the vendor.
pub struct FreeSource {
    base_url: String,
    client: reqwest::Client,
}

impl FreeSource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(FreeSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct FreeRatesResponse {
    rates: Option<RateMap>,
    conversion_rates: Option<RateMap>,
}

#[async_trait]
impl RateSource for FreeSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_rates(&self, base: &str) -> Result<RateMap, SourceError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(SourceError::Network)?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let text = response.text().await.map_err(SourceError::Network)?;
        let data: FreeRatesResponse = serde_json::from_str(&text)
            .map_err(|e| SourceError::Malformed(format!("{e} for {url}")))?;

        let rates = data
            .rates
            .or(data.conversion_rates)
            .ok_or_else(|| SourceError::Malformed("no rates or conversion_rates object".into()))?;
        validate_rates(rates)
    }
}
