//! Exchange-Rate Upstream
//!
//! Third-party rate API behind a trait so routes can be exercised without
//! network access.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure, timeout or undecodable body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream answered with status {0}")]
    Status(u16),
}

// == Exchange Rate Source ==
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Fetches the current exchange-rate document.
    async fn exchange_rates(&self) -> Result<Value, UpstreamError>;
}

// == HTTP Source ==
/// Fetches rates from a JSON endpoint such as CoinGecko's `exchange_rates`.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    /// # Arguments
    /// * `url` - Endpoint returning the rates document
    /// * `timeout` - Whole-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ExchangeRateSource for HttpRateSource {
    async fn exchange_rates(&self) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        // Nothing listens on port 9 of the loopback interface
        let source = HttpRateSource::new("http://127.0.0.1:9/rates", Duration::from_secs(2)).unwrap();

        let result = source.exchange_rates().await;
        assert!(matches!(result, Err(UpstreamError::Request(_))));
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(
            UpstreamError::Status(503).to_string(),
            "upstream answered with status 503"
        );
    }
}
