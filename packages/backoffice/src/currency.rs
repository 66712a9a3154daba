// ABOUTME: Currency conversion client used by analytics and payouts
// ABOUTME: External rate source reached over HTTP, no caching or staleness policy

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("No rate available for {0}")]
    MissingRate(String),
}

/// Opaque collaborator converting money amounts between currencies
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError>;
}

#[derive(Deserialize)]
struct RateResponse {
    rates: HashMap<String, f64>,
}

/// Converter backed by an external exchange-rate HTTP API
pub struct HttpCurrencyConverter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCurrencyConverter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl CurrencyConverter for HttpCurrencyConverter {
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(amount);
        }

        let url = format!("{}/latest?base={}&symbols={}", self.base_url, from, to);
        debug!("Fetching exchange rate: {} -> {}", from, to);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RateResponse>()
            .await?;

        let rate = response
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| CurrencyError::MissingRate(format!("{}->{}", from, to)))?;

        Ok(amount * rate)
    }
}

/// Fixed-rate converter for tests
#[derive(Default)]
pub struct FixedRateConverter {
    rates: HashMap<(String, String), f64>,
}

impl FixedRateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: f64) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl CurrencyConverter for FixedRateConverter {
    async fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(amount);
        }

        let rate = self
            .rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| CurrencyError::MissingRate(format!("{}->{}", from, to)))?;

        Ok(amount * rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_same_currency_short_circuits() {
        // No server configured, so any HTTP call would fail
        let converter = HttpCurrencyConverter::new("http://127.0.0.1:1");
        let result = converter.convert(42.0, "USD", "USD").await.unwrap();
        assert_eq!(result, 42.0);
    }

    #[tokio::test]
    async fn test_http_conversion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "EUR"))
            .and(query_param("symbols", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "EUR",
                "rates": { "USD": 1.10 }
            })))
            .mount(&server)
            .await;

        let converter = HttpCurrencyConverter::new(server.uri());
        let result = converter.convert(100.0, "EUR", "USD").await.unwrap();
        assert!((result - 110.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_rate_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "base": "EUR",
                "rates": {}
            })))
            .mount(&server)
            .await;

        let converter = HttpCurrencyConverter::new(server.uri());
        let err = converter.convert(100.0, "EUR", "JPY").await.unwrap_err();
        assert!(matches!(err, CurrencyError::MissingRate(_)));
    }

    #[tokio::test]
    async fn test_fixed_rate_converter() {
        let converter = FixedRateConverter::new().with_rate("GBP", "USD", 1.25);
        assert_eq!(converter.convert(8.0, "GBP", "USD").await.unwrap(), 10.0);
        assert!(converter.convert(1.0, "GBP", "JPY").await.is_err());
    }
}
