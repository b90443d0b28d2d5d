// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Cannot analyze an empty price series")]
    EmptySeries,
    #[error("Invalid EMA period: {0}")]
    InvalidPeriod(usize),
    #[error("Short EMA period ({short}) must be below long EMA period ({long})")]
    PeriodOrder { short: usize, long: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
