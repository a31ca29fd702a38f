use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, validate_rates};
use crate::core::rate::{RateMap, RateSource, SourceError};

/// Keyed exchangerate-api.com v6 endpoint, tried first when an API key
/// is configured. `GET {base_url}/{api_key}/latest/{base}` returns an
/// envelope with a `result` flag and the `conversion_rates` table.
pub struct PremiumSource {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PremiumSource {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        Ok(PremiumSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: http_client()?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct PremiumResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    conversion_rates: Option<RateMap>,
}

#[async_trait]
impl RateSource for PremiumSource {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn fetch_rates(&self, base: &str) -> Result<RateMap, SourceError> {
        let url = format!("{}/{}/latest/{}", self.base_url, self.api_key, base);
        // The URL embeds the key, so log the base currency instead.
        debug!(%base, "Requesting premium rates");

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
        let data: PremiumResponse =
            serde_json::from_str(&text).map_err(|e| SourceError::Malformed(e.to_string()))?;

        if data.result != "success" {
            return Err(SourceError::Upstream(
                data.error_type.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let rates = data
            .conversion_rates
            .ok_or_else(|| SourceError::Malformed("missing conversion_rates object".into()))?;
        validate_rates(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(api_key: &str, base: &str, response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{api_key}/latest/{base}")))
            .respond_with(response)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_successful_premium_fetch() {
        let body = r#"{
            "result": "success",
            "conversion_rates": {"EUR": 0.86, "GBP": 0.74}
        }"#;
        let mock_server =
            create_mock_server("test-key", "USD", ResponseTemplate::new(200).set_body_string(body))
                .await;

        let source = PremiumSource::new(&mock_server.uri(), "test-key").unwrap();
        let rates = source.fetch_rates("USD").await.unwrap();
        assert_eq!(rates.get("EUR"), Some(&0.86));
    }

    #[tokio::test]
    async fn test_upstream_reported_error() {
        let body = r#"{"result": "error", "error-type": "invalid-key"}"#;
        let mock_server =
            create_mock_server("bad-key", "USD", ResponseTemplate::new(200).set_body_string(body))
                .await;

        let source = PremiumSource::new(&mock_server.uri(), "bad-key").unwrap();
        let err = source.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, SourceError::Upstream(ref kind) if kind == "invalid-key"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock_server = create_mock_server("test-key", "USD", ResponseTemplate::new(500)).await;

        let source = PremiumSource::new(&mock_server.uri(), "test-key").unwrap();
        let err = source.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, SourceError::Status(status) if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_zero_rate_is_malformed() {
        let body = r#"{
            "result": "success",
            "conversion_rates": {"EUR": 0.0}
        }"#;
        let mock_server =
            create_mock_server("test-key", "USD", ResponseTemplate::new(200).set_body_string(body))
                .await;

        let source = PremiumSource::new(&mock_server.uri(), "test-key").unwrap();
        let err = source.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_success_without_rates_is_malformed() {
        let body = r#"{"result": "success"}"#;
        let mock_server =
            create_mock_server("test-key", "USD", ResponseTemplate::new(200).set_body_string(body))
                .await;

        let source = PremiumSource::new(&mock_server.uri(), "test-key").unwrap();
        let err = source.fetch_rates("USD").await.unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
