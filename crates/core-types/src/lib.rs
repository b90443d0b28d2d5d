// In crates/core-types/src/lib.rs

pub mod error;
pub mod series;
pub mod timeframe;
pub mod trend;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use series::PriceSeries;
pub use timeframe::Timeframe;
pub use trend::{
    AnnotatedBar, Crossover, CrossoverDirection, CrossoverEvent, TrendAnalysis, TrendLabel,
    TrendReport, TrendStrength,
};
pub use types::{PriceBar, Symbol};
