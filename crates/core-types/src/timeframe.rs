// In crates/core-types/src/timeframe.rs

//! The fixed set of bucket widths a price series can be resampled to.

use crate::error::Error;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket width for resampled bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    FourHours,
    SixHours,
    TwelveHours,
    #[default]
    OneDay,
    TwoDays,
    ThreeDays,
    OneWeek,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::FourHours,
        Timeframe::SixHours,
        Timeframe::TwelveHours,
        Timeframe::OneDay,
        Timeframe::TwoDays,
        Timeframe::ThreeDays,
        Timeframe::OneWeek,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Timeframe::FourHours => "4H",
            Timeframe::SixHours => "6H",
            Timeframe::TwelveHours => "12H",
            Timeframe::OneDay => "1D",
            Timeframe::TwoDays => "2D",
            Timeframe::ThreeDays => "3D",
            Timeframe::OneWeek => "1W",
        }
    }

    /// The width of one bucket, in seconds.
    pub const fn seconds(&self) -> i64 {
        const HOUR: i64 = 3_600;
        match self {
            Timeframe::FourHours => 4 * HOUR,
            Timeframe::SixHours => 6 * HOUR,
            Timeframe::TwelveHours => 12 * HOUR,
            Timeframe::OneDay => 24 * HOUR,
            Timeframe::TwoDays => 48 * HOUR,
            Timeframe::ThreeDays => 72 * HOUR,
            Timeframe::OneWeek => 168 * HOUR,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// How many days of raw history to request for this bucket width.
    pub const fn default_lookback_days(&self) -> u32 {
        match self {
            Timeframe::FourHours | Timeframe::SixHours | Timeframe::TwelveHours => 30,
            Timeframe::OneDay => 90,
            Timeframe::TwoDays | Timeframe::ThreeDays | Timeframe::OneWeek => 365,
        }
    }

    /// Unix timestamp all bucket edges are measured from.
    ///
    /// Weekly buckets start on Monday 00:00 UTC (1970-01-05); everything else
    /// starts at the epoch, which is midnight UTC.
    const fn origin(&self) -> i64 {
        match self {
            Timeframe::OneWeek => 4 * 86_400,
            _ => 0,
        }
    }

    /// The start of the bucket containing `timestamp`.
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let origin = self.origin();
        let width = self.seconds();
        let offset = (timestamp.timestamp() - origin).div_euclid(width);
        let start = origin + offset * width;
        // Bucket starts are whole seconds inside chrono's supported range.
        Utc.timestamp_opt(start, 0).single().unwrap_or(timestamp)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownTimeframe(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("4h".parse::<Timeframe>().unwrap(), Timeframe::FourHours);
        assert_eq!(" 1W ".parse::<Timeframe>().unwrap(), Timeframe::OneWeek);
        assert!("5m".parse::<Timeframe>().is_err());
    }

    #[test]
    fn labels_round_trip_through_display() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn lookback_matches_bucket_width() {
        assert_eq!(Timeframe::SixHours.default_lookback_days(), 30);
        assert_eq!(Timeframe::OneDay.default_lookback_days(), 90);
        assert_eq!(Timeframe::ThreeDays.default_lookback_days(), 365);
    }

    #[test]
    fn hourly_buckets_align_to_midnight() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 5, 59, 59).unwrap();
        let start = Timeframe::FourHours.bucket_start(ts);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 4, 0, 0).unwrap());
        let start = Timeframe::TwelveHours.bucket_start(ts);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekly_buckets_start_on_monday() {
        // 2024-03-10 is a Sunday.
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 23, 0, 0).unwrap();
        let start = Timeframe::OneWeek.bucket_start(ts);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn pre_epoch_timestamps_floor_downwards() {
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 23, 0, 0).unwrap();
        let start = Timeframe::OneDay.bucket_start(ts);
        assert_eq!(start, Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Timeframe::TwelveHours).unwrap();
        assert_eq!(json, "\"12H\"");
        let tf: Timeframe = serde_json::from_str("\"2d\"").unwrap();
        assert_eq!(tf, Timeframe::TwoDays);
    }
}
