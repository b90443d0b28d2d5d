// In crates/strategies/src/ema_crossover.rs

use crate::ema::ema_series;
use crate::error::{Error, Result};
use crate::types::EmaCrossoverSettings;
use crate::TrendStrategy;
use core_types::{
    AnnotatedBar, Crossover, CrossoverDirection, CrossoverEvent, PriceSeries, TrendAnalysis,
    TrendLabel, TrendReport, TrendStrength,
};

/// Dual-EMA trend classifier.
///
/// The label comes from the latest positioning alone (short EMA above long
/// EMA is bullish, anything else bearish). Crossovers only raise the
/// strength score.
#[derive(Debug, Clone, Default)]
pub struct EmaCrossover {
    settings: EmaCrossoverSettings,
}

impl EmaCrossover {
    /// Creates a new `EmaCrossover` analyzer from its settings.
    pub fn new(settings: EmaCrossoverSettings) -> Result<Self> {
        if settings.short_period == 0 {
            return Err(Error::InvalidPeriod(settings.short_period));
        }
        if settings.short_period >= settings.long_period {
            return Err(Error::PeriodOrder {
                short: settings.short_period,
                long: settings.long_period,
            });
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EmaCrossoverSettings {
        &self.settings
    }

    fn strength(&self, own_direction: CrossoverDirection, crossover: Option<Crossover>) -> TrendStrength {
        match crossover {
            Some(c) if c.direction == own_direction => {
                if c.periods_ago as usize <= self.settings.fresh_crossover_window {
                    TrendStrength::Fresh
                } else {
                    TrendStrength::Confirmed
                }
            }
            _ => TrendStrength::Base,
        }
    }
}

impl TrendStrategy for EmaCrossover {
    fn name(&self) -> &'static str {
        "EmaCrossover"
    }

    fn min_periods(&self) -> usize {
        self.settings.min_periods
    }

    fn analyze(&self, series: &PriceSeries) -> Result<TrendReport> {
        let closes = series.closes();
        let Some(&last_close) = closes.last() else {
            return Err(Error::EmptySeries);
        };

        let ema_short = ema_series(&closes, self.settings.short_period)?;
        let ema_long = ema_series(&closes, self.settings.long_period)?;
        let last = closes.len() - 1;
        let (short_now, long_now) = (ema_short[last], ema_long[last]);

        // 1. Current positioning decides the label.
        let short_above_long = short_now > long_now;
        let (trend, own_direction) = if short_above_long {
            (TrendLabel::Bullish, CrossoverDirection::Bullish)
        } else {
            (TrendLabel::Bearish, CrossoverDirection::Bearish)
        };

        // 2. The nearest crossover inside the lookback window.
        let crossover = latest_crossover(&ema_short, &ema_long, self.settings.crossover_lookback);

        // 3. Strength from a supporting crossover.
        let strength = self.strength(own_direction, crossover);

        let analysis = TrendAnalysis {
            trend,
            strength,
            ema_short_value: short_now,
            ema_long_value: long_now,
            ema_short_above_long: short_above_long,
            recent_bullish_cross: crossover.is_some_and(|c| c.direction == CrossoverDirection::Bullish),
            recent_bearish_cross: crossover.is_some_and(|c| c.direction == CrossoverDirection::Bearish),
            crossover_periods_ago: crossover.map(|c| c.periods_ago),
            price_above_ema_short: last_close > short_now,
            price_above_ema_long: last_close > long_now,
        };

        let bars = series
            .iter()
            .zip(ema_short.iter().zip(ema_long.iter()))
            .map(|(bar, (&ema_short, &ema_long))| AnnotatedBar { bar: *bar, ema_short, ema_long })
            .collect();

        let crossovers = find_crossovers(&ema_short, &ema_long)
            .into_iter()
            .map(|(i, direction)| {
                let bar = &series.bars()[i];
                CrossoverEvent { timestamp: bar.timestamp, direction, close: bar.close }
            })
            .collect();

        Ok(TrendReport { analysis, bars, crossovers })
    }
}

/// The crossover completed at index `i`, judged on the pair `(i - 1, i)`.
///
/// Bullish when the short EMA goes from at-or-below to strictly above the
/// long EMA, bearish when it goes from at-or-above to strictly below.
fn crossover_at(short: &[f64], long: &[f64], i: usize) -> Option<CrossoverDirection> {
    let (prev_s, prev_l, cur_s, cur_l) = (short[i - 1], long[i - 1], short[i], long[i]);
    if prev_s <= prev_l && cur_s > cur_l {
        Some(CrossoverDirection::Bullish)
    } else if prev_s >= prev_l && cur_s < cur_l {
        Some(CrossoverDirection::Bearish)
    } else {
        None
    }
}

/// Scans back from the latest period, at most `lookback` pairs, and returns
/// the first crossover found. Older crossovers in the window are ignored.
pub fn latest_crossover(short: &[f64], long: &[f64], lookback: usize) -> Option<Crossover> {
    let n = short.len().min(long.len());
    (1..=lookback)
        .take_while(|&periods_ago| periods_ago < n)
        .find_map(|periods_ago| {
            crossover_at(short, long, n - periods_ago).map(|direction| Crossover {
                direction,
                periods_ago: periods_ago as u32,
            })
        })
}

/// Every crossover in the series as `(index, direction)`, oldest first.
pub fn find_crossovers(short: &[f64], long: &[f64]) -> Vec<(usize, CrossoverDirection)> {
    let n = short.len().min(long.len());
    (1..n)
        .filter_map(|i| crossover_at(short, long, i).map(|d| (i, d)))
        .collect()
}
