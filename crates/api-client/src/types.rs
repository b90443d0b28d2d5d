// In crates/api-client/src/types.rs

use reqwest::Client;
use serde::Deserialize;

/// The main client for the CoinGecko REST API.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    /// The persistent HTTP client. Carries the API key header when one is set.
    pub http_client: Client,
    /// The base URL requests are sent to (public or pro).
    pub base_url: String,
    /// Quote currency for all prices.
    pub vs_currency: String,
    /// Whether requests go to the pro endpoint.
    pub authenticated: bool,
}

/// Temporary struct to deserialize the OHLC response,
/// which is a JSON array of five numbers per bar.
#[derive(Debug, Deserialize)]
pub struct RawOhlc(
    pub i64, // 0: Timestamp (ms)
    pub f64, // 1: Open
    pub f64, // 2: High
    pub f64, // 3: Low
    pub f64, // 4: Close
);

/// The shapes CoinGecko uses to report a failed request.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Status { status: ErrorStatus },
    Message { error: String },
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    pub error_code: i64,
    pub error_message: String,
}
