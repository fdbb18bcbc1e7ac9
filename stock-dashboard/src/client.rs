//! REST client for the recommendation service
//!
//! [`QuoteSource`] is the seam the dashboard fetches through, so tests can
//! script responses without a server.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::{
    config::DashboardConfig,
    error::DashboardError,
    types::{PriceHistory, Quote},
};

/// Source of quotes for the dashboard
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch quotes for every tracked instrument
    async fn fetch_quotes(&self) -> Result<Vec<Quote>, DashboardError>;

    /// Fetch the quote for a single instrument
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, DashboardError>;

    /// Fetch one month of daily closes for a single instrument
    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, DashboardError>;
}

/// [`QuoteSource`] backed by the service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpQuoteSource {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpQuoteSource {
    pub fn new(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DashboardError::Config(format!("invalid API_BASE_URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::Config(format!(
                "API_BASE_URL '{}' cannot be used as a base URL",
                config.base_url
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            timeout: config.request_timeout,
        })
    }

    /// Build an endpoint URL below the base, percent-encoding each segment
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, DashboardError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DashboardError::Config(format!("cannot extend base URL {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DashboardError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| DashboardError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DashboardError::Request(e.to_string()))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>, DashboardError> {
        let url = self.endpoint(&["api", "stocks"])?;
        self.get_json(url).await
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, DashboardError> {
        let url = self.endpoint(&["api", "stock", symbol])?;
        self.get_json(url).await
    }

    async fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, DashboardError> {
        let url = self.endpoint(&["api", "historico", symbol])?;
        self.get_json(url).await
    }
}
