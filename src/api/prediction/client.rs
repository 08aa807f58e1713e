use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{
    extract_error_message, rows_from_value, ActualPricesResponse, ApiError, IntervalRequest,
    RawPredictionResponse, RawPriceRow,
};
use crate::models::{Interval, Market};

/// Client for the price prediction backend
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http_client: HttpClient,
    base_url: String,
}

/// Endpoint path and query for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl PredictionClient {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000";

    /// Create a client against the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// POST path for historical actual prices
    pub fn actual_prices_endpoint(market: Market) -> Endpoint {
        let path = match market {
            Market::Gold => "/api/fxprediction/actual-prices/",
            Market::Currency(_) => "/api/currencty/actual-currency-prices/",
        };
        Endpoint { path: path.to_string(), query: Vec::new() }
    }

    /// GET path (and query) for previously predicted prices
    pub fn predicted_prices_endpoint(market: Market, interval: Interval) -> Endpoint {
        match market {
            Market::Gold => Endpoint {
                path: format!("/api/fxprediction/predicted-prices-{}/", interval.as_str()),
                query: Vec::new(),
            },
            Market::Currency(symbol) => Endpoint {
                path: "/api/currencty/historical-predicted-currency-prices/".to_string(),
                query: vec![
                    ("symbol", symbol.as_str().to_string()),
                    ("interval", interval.as_str().to_string()),
                ],
            },
        }
    }

    /// POST path for a fresh prediction run
    pub fn prediction_result_endpoint(market: Market) -> Endpoint {
        let path = match market {
            Market::Gold => "/api/fxprediction/result/",
            Market::Currency(_) => "/api/currency/prediction-results/",
        };
        Endpoint { path: path.to_string(), query: Vec::new() }
    }

    fn request_body(market: Market, interval: Interval) -> IntervalRequest<'static> {
        IntervalRequest {
            interval: interval.as_str(),
            symbol: match market {
                Market::Gold => None,
                Market::Currency(symbol) => Some(symbol.as_str()),
            },
        }
    }

    /// Fetch the actual OHLC history
    ///
    /// A missing or non-array `data` field yields an empty series.
    pub async fn actual_prices(
        &self,
        market: Market,
        interval: Interval,
    ) -> Result<Vec<RawPriceRow>, ApiError> {
        let endpoint = Self::actual_prices_endpoint(market);
        let body = Self::request_body(market, interval);
        let response: ActualPricesResponse = self.post_json(&endpoint, &body).await?;
        let rows: Vec<RawPriceRow> = rows_from_value(&response.data);
        debug!("Fetched {} actual rows for {} {}", rows.len(), market, interval);
        Ok(rows)
    }

    /// Fetch the stored predictions for past candles
    pub async fn predicted_prices(
        &self,
        market: Market,
        interval: Interval,
    ) -> Result<Vec<RawPriceRow>, ApiError> {
        let endpoint = Self::predicted_prices_endpoint(market, interval);
        let payload: Value = self.get_json(&endpoint).await?;
        let rows: Vec<RawPriceRow> = rows_from_value(&payload);
        debug!("Fetched {} predicted rows for {} {}", rows.len(), market, interval);
        Ok(rows)
    }

    /// Run a prediction for the upcoming candles
    pub async fn prediction_result(
        &self,
        market: Market,
        interval: Interval,
    ) -> Result<RawPredictionResponse, ApiError> {
        let endpoint = Self::prediction_result_endpoint(market);
        let body = Self::request_body(market, interval);
        let response: RawPredictionResponse = self.post_json(&endpoint, &body).await?;

        if response.predictions.as_array().map_or(true, |rows| rows.is_empty()) {
            return Err(ApiError::EmptyPredictions);
        }

        Ok(response)
    }

    async fn post_json<B, T>(&self, endpoint: &Endpoint, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint.path);
        let response = self
            .http_client
            .post(&url)
            .query(&endpoint.query)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    async fn get_json<T>(&self, endpoint: &Endpoint) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint.path);
        let response = self
            .http_client
            .get(&url)
            .query(&endpoint.query)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(status.as_u16(), &body_text);
            warn!("Prediction API returned {}: {}", status, message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}
