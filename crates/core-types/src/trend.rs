// In crates/core-types/src/trend.rs

use crate::error::Error;
use crate::types::PriceBar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The trend classification vocabulary.
///
/// `Neutral` is part of the label vocabulary consumed by the dashboard, but the
/// EMA crossover classifier only ever produces `Bullish` or `Bearish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendLabel::Bullish => "BULLISH",
            TrendLabel::Bearish => "BEARISH",
            TrendLabel::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Confidence in the current trend label. Serialized as its numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum TrendStrength {
    /// Positioning only, no supporting crossover in the lookback window.
    Base,
    /// A crossover in the trend's direction inside the lookback window.
    Confirmed,
    /// That crossover is also among the most recent periods.
    Fresh,
}

impl TrendStrength {
    pub const fn score(&self) -> f64 {
        match self {
            TrendStrength::Base => 0.6,
            TrendStrength::Confirmed => 0.8,
            TrendStrength::Fresh => 1.0,
        }
    }
}

impl From<TrendStrength> for f64 {
    fn from(strength: TrendStrength) -> Self {
        strength.score()
    }
}

impl TryFrom<f64> for TrendStrength {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        [TrendStrength::Base, TrendStrength::Confirmed, TrendStrength::Fresh]
            .into_iter()
            .find(|s| (s.score() - value).abs() < 1e-9)
            .ok_or(Error::InvalidStrength(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossoverDirection {
    Bullish,
    Bearish,
}

/// The most recent crossover found while scanning back from the latest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossover {
    pub direction: CrossoverDirection,
    /// 1 means the crossing completed on the latest period.
    pub periods_ago: u32,
}

/// Result of one trend analysis over a resampled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub trend: TrendLabel,
    pub strength: TrendStrength,
    pub ema_short_value: f64,
    pub ema_long_value: f64,
    pub ema_short_above_long: bool,
    pub recent_bullish_cross: bool,
    pub recent_bearish_cross: bool,
    pub crossover_periods_ago: Option<u32>,
    pub price_above_ema_short: bool,
    pub price_above_ema_long: bool,
}

/// A resampled bar with both EMA values attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    #[serde(flatten)]
    pub bar: PriceBar,
    pub ema_short: f64,
    pub ema_long: f64,
}

/// A crossover anywhere in the series, used for chart markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub timestamp: DateTime<Utc>,
    pub direction: CrossoverDirection,
    pub close: f64,
}

/// Everything the presentation layer needs for one asset and timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub analysis: TrendAnalysis,
    pub bars: Vec<AnnotatedBar>,
    pub crossovers: Vec<CrossoverEvent>,
}

impl TrendReport {
    /// Latest close and its change against the previous bucket, in percent.
    pub fn price_change(&self) -> Option<(f64, f64)> {
        let [.., previous, latest] = self.bars.as_slice() else {
            return None;
        };
        let change = (latest.bar.close - previous.bar.close) / previous.bar.close * 100.0;
        Some((latest.bar.close, change))
    }
}
