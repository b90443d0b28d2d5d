// In crates/api-client/src/lib.rs

use app_config::types::CoinGeckoSettings;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use core_types::{PriceBar, PriceSeries, Symbol};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

pub mod error;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// Header carrying the Pro API key.
pub const API_KEY_HEADER: &str = "x-cg-pro-api-key";

/// Lookback values the OHLC endpoint accepts, in days.
pub const SUPPORTED_LOOKBACK_DAYS: [u32; 7] = [1, 7, 14, 30, 90, 180, 365];

/// The seam between the analysis pipeline and the upstream data source.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches raw OHLC bars covering the last `lookback_days` days.
    ///
    /// An empty series means the provider had no data for the symbol.
    async fn fetch_ohlc(&self, symbol: &Symbol, lookback_days: u32) -> Result<PriceSeries>;
}

/// Rounds a requested lookback up to the nearest value the provider accepts.
///
/// Requests beyond the largest supported value are capped at 365 days.
pub fn supported_lookback_days(days: u32) -> u32 {
    SUPPORTED_LOOKBACK_DAYS
        .into_iter()
        .find(|&d| d >= days)
        .unwrap_or(365)
}

impl CoinGeckoClient {
    /// Constructs a new client from `CoinGeckoSettings`.
    ///
    /// With an API key the client targets the pro endpoint and sends the key
    /// on every request; without one it falls back to the public endpoint.
    pub fn new(settings: &CoinGeckoSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let (base_url, authenticated) = match settings.api_key() {
            Some(key) => {
                let mut value = HeaderValue::from_str(key)
                    .map_err(|e| Error::ClientBuildError(format!("invalid API key: {}", e)))?;
                value.set_sensitive(true);
                headers.insert(API_KEY_HEADER, value);
                (settings.pro_base_url.clone(), true)
            }
            None => (settings.public_base_url.clone(), false),
        };

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(CoinGeckoClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            vs_currency: settings.vs_currency.clone(),
            authenticated,
        })
    }

    /// The OHLC endpoint for a coin.
    pub fn ohlc_url(&self, symbol: &Symbol) -> String {
        format!("{}/coins/{}/ohlc", self.base_url, symbol.as_str())
    }

    /// Fetches historical OHLC bars.
    ///
    /// This corresponds to the `GET /coins/{id}/ohlc` endpoint. The lookback is
    /// rounded up with [`supported_lookback_days`]. No retries are attempted.
    pub async fn get_ohlc(&self, symbol: &Symbol, days: u32) -> Result<PriceSeries> {
        let api_days = supported_lookback_days(days);
        let url = self.ohlc_url(symbol);
        tracing::debug!(symbol = %symbol, requested_days = days, api_days, "Fetching OHLC history.");

        let response = self
            .http_client
            .get(&url)
            .query(&[("vs_currency", self.vs_currency.clone()), ("days", api_days.to_string())])
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::RequestFailed)?;

        if !status.is_success() {
            return Err(api_error(&body).unwrap_or_else(|| Error::ApiError {
                code: i64::from(status.as_u16()),
                msg: status.canonical_reason().unwrap_or("Unknown error").to_string(),
            }));
        }

        let series = parse_ohlc(&body)?;
        tracing::debug!(symbol = %symbol, bars = series.len(), "Received OHLC history.");
        Ok(series)
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn fetch_ohlc(&self, symbol: &Symbol, lookback_days: u32) -> Result<PriceSeries> {
        self.get_ohlc(symbol, lookback_days).await
    }
}

/// Parses an OHLC response body into a validated series.
///
/// The body is a JSON array of `[timestamp_ms, open, high, low, close]`.
/// An empty array yields an empty series.
pub fn parse_ohlc(body: &str) -> Result<PriceSeries> {
    let raw: Vec<RawOhlc> = serde_json::from_str(body).map_err(|e| {
        // If deserialization fails, it might be a provider error object.
        api_error(body).unwrap_or(Error::DeserializationFailed(e))
    })?;

    // Convert the raw rows into our clean, internal bar type.
    let bars = raw
        .into_iter()
        .map(|RawOhlc(ts, open, high, low, close)| {
            let timestamp = Utc
                .timestamp_millis_opt(ts)
                .single()
                .ok_or(Error::InvalidTimestamp(ts))?;
            Ok(PriceBar::new(timestamp, open, high, low, close))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PriceSeries::from_unordered(bars)?)
}

/// Extracts a provider error object from a response body, if it is one.
fn api_error(body: &str) -> Option<Error> {
    match serde_json::from_str::<ErrorBody>(body).ok()? {
        ErrorBody::Status { status } => Some(Error::ApiError {
            code: status.error_code,
            msg: status.error_message,
        }),
        ErrorBody::Message { error } => Some(Error::ApiError { code: -1, msg: error }),
    }
}

// Free function to allow api_client::new usage
pub fn new(settings: &CoinGeckoSettings) -> Result<CoinGeckoClient> {
    CoinGeckoClient::new(settings)
}
