// In crates/strategies/src/ema.rs

use crate::error::{Error, Result};
use ta::Next;
use ta::indicators::ExponentialMovingAverage as Ema;

/// Computes the EMA of `values` for every position.
///
/// Uses the recursive form with `alpha = 2 / (period + 1)`, seeded with the
/// first value: `ema[0] = values[0]`, `ema[i] = alpha * values[i] + (1 - alpha) * ema[i - 1]`.
pub fn ema_series(values: &[f64], period: usize) -> Result<Vec<f64>> {
    let mut ema = Ema::new(period).map_err(|_| Error::InvalidPeriod(period))?;
    Ok(values.iter().map(|v| ema.next(*v)).collect())
}

/// The smoothing factor used by [`ema_series`].
pub fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}
