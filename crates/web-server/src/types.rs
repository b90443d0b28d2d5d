// In crates/web-server/src/types.rs

use core_types::{AnnotatedBar, CrossoverEvent, Timeframe, TrendAnalysis};
use serde::{Deserialize, Serialize};

/// The `?timeframe=` query parameter. Absent means the configured default.
#[derive(Debug, Default, Deserialize)]
pub struct TimeframeQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimeframesResponse {
    pub timeframes: Vec<Timeframe>,
    pub default: Timeframe,
}

/// Per-asset entry of the summary table.
#[derive(Debug, Serialize)]
pub struct AssetSummary {
    pub name: String,
    pub id: String,
    #[serde(flatten)]
    pub status: AssetStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssetStatus {
    Ok {
        price: f64,
        /// Change of the latest close against the previous bucket, in percent.
        change_pct: Option<f64>,
        analysis: TrendAnalysis,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub timeframe: Timeframe,
    pub strategy: &'static str,
    pub assets: Vec<AssetSummary>,
}

/// Everything the chart of one asset needs.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub name: String,
    pub id: String,
    pub timeframe: Timeframe,
    pub bars: Vec<AnnotatedBar>,
    pub crossovers: Vec<CrossoverEvent>,
    pub analysis: TrendAnalysis,
}

#[derive(Debug, Serialize)]
pub struct HeatmapRow {
    pub name: String,
    pub id: String,
    /// One signed strength per timeframe: positive bullish, negative
    /// bearish, `None` when the asset had no usable data.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub timeframes: Vec<Timeframe>,
    pub rows: Vec<HeatmapRow>,
}
