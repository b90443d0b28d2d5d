// In crates/core-types/src/series.rs

use crate::error::{Error, Result};
use crate::timeframe::Timeframe;
use crate::types::PriceBar;
use serde::Serialize;

/// An ordered, duplicate-free sequence of price bars.
///
/// Every constructor validates that timestamps strictly increase and that all
/// prices are finite and positive, so downstream code can index freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series from bars that are already in ascending time order.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for bar in &bars {
            if let Some((field, value)) = bar.invalid_field() {
                return Err(Error::InvalidPrice { timestamp: bar.timestamp, field, value });
            }
        }
        for pair in bars.windows(2) {
            let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
            if current == previous {
                return Err(Error::DuplicateTimestamp(current));
            }
            if current < previous {
                return Err(Error::OutOfOrder { previous, timestamp: current });
            }
        }
        Ok(Self { bars })
    }

    /// Builds a series from bars in any order.
    ///
    /// Bars are sorted by timestamp; when a timestamp repeats, the bar that
    /// appeared last in the input wins.
    pub fn from_unordered(mut bars: Vec<PriceBar>) -> Result<Self> {
        // Stable sort keeps input order among equal timestamps.
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self::new(deduped)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceBar> {
        self.bars.iter()
    }

    /// The closing-price column.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }

    /// Aggregates the series into fixed-width buckets.
    ///
    /// open = first open, high = max high, low = min low, close = last close.
    /// Buckets with no underlying bars are dropped, not zero-filled. Each
    /// output bar is stamped with its bucket start (see [`Timeframe::bucket_start`]).
    pub fn resample(&self, timeframe: Timeframe) -> PriceSeries {
        let mut out: Vec<PriceBar> = Vec::new();
        for bar in &self.bars {
            let bucket = timeframe.bucket_start(bar.timestamp);
            match out.last_mut() {
                Some(agg) if agg.timestamp == bucket => {
                    agg.high = agg.high.max(bar.high);
                    agg.low = agg.low.min(bar.low);
                    agg.close = bar.close;
                }
                _ => out.push(PriceBar { timestamp: bucket, ..*bar }),
            }
        }
        // Input is ascending, so bucket starts are ascending and unique.
        PriceSeries { bars: out }
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceBar;
    type IntoIter = std::slice::Iter<'a, PriceBar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
