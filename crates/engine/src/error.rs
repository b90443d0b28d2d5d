// In crates/engine/src/error.rs

use core_types::Symbol;
use thiserror::Error;

/// Every way an asset can end up without a usable analysis.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to fetch market data: {0}")]
    Fetch(#[from] api_client::Error),
    #[error("No price data returned for {0}")]
    NoData(Symbol),
    #[error("Insufficient data: {periods} periods after resampling, {required} required")]
    InsufficientData { periods: usize, required: usize },
    #[error("Analysis failed: {0}")]
    Analysis(#[from] strategies::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
