// In crates/strategies/src/lib.rs

use core_types::{PriceSeries, TrendReport};
pub mod ema;
pub mod ema_crossover;
pub mod error;
pub mod types;

pub use ema_crossover::EmaCrossover;
pub use error::{Error, Result};
pub use types::EmaCrossoverSettings;

/// The interface for a trend classifier.
///
/// Implementations are pure: the same series always produces the same report,
/// and no state carries over between calls.
pub trait TrendStrategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Resampled series shorter than this are treated as insufficient data.
    fn min_periods(&self) -> usize;

    fn analyze(&self, series: &PriceSeries) -> Result<TrendReport>;
}
