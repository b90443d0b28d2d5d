// In crates/core-types/src/error.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bar at {timestamp} is out of order (previous bar at {previous})")]
    OutOfOrder {
        previous: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },
    #[error("Duplicate bar timestamp: {0}")]
    DuplicateTimestamp(DateTime<Utc>),
    #[error("Bar at {timestamp} has an invalid {field} price: {value}")]
    InvalidPrice {
        timestamp: DateTime<Utc>,
        field: &'static str,
        value: f64,
    },
    #[error("Unknown timeframe: {0}")]
    UnknownTimeframe(String),
    #[error("Invalid trend strength: {0}")]
    InvalidStrength(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
