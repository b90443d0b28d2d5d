// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EmaCrossoverSettings {
    // The fast and slow EMA periods
    pub short_period: usize,
    pub long_period: usize,

    // How many periods back to look for a crossover
    pub crossover_lookback: usize,
    // A crossover this recent counts as fresh
    pub fresh_crossover_window: usize,

    // Fewer resampled periods than this is treated as insufficient data
    pub min_periods: usize,
}

impl Default for EmaCrossoverSettings {
    fn default() -> Self {
        Self {
            short_period: 12,
            long_period: 21,
            crossover_lookback: 5,
            fresh_crossover_window: 2,
            min_periods: 25,
        }
    }
}
