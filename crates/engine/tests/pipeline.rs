// End-to-end runs of the engine over provider-shaped JSON bodies.

use api_client::{MarketDataProvider, parse_ohlc};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use core_types::{PriceSeries, Symbol, Timeframe, TrendLabel, TrendStrength};
use engine::{AnalysisEngine, Error};
use std::sync::Arc;
use std::time::Duration;
use strategies::EmaCrossover;

/// Replays one canned response body for every request.
struct JsonProvider {
    body: String,
}

#[async_trait]
impl MarketDataProvider for JsonProvider {
    async fn fetch_ohlc(&self, _symbol: &Symbol, _lookback_days: u32) -> api_client::Result<PriceSeries> {
        parse_ohlc(&self.body)
    }
}

/// Four-hour candles, newest first, one daily close per entry of `daily_closes`.
fn four_hour_body(daily_closes: &[f64]) -> String {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut rows = Vec::new();
    for (day, &close) in daily_closes.iter().enumerate() {
        for slot in 0..6 {
            let ts = start + ChronoDuration::days(day as i64) + ChronoDuration::hours(4 * slot);
            rows.push(format!(
                "[{},{},{},{},{}]",
                ts.timestamp_millis(),
                close,
                close * 1.01,
                close * 0.99,
                close
            ));
        }
    }
    rows.reverse();
    format!("[{}]", rows.join(","))
}

fn engine_for(body: String) -> AnalysisEngine {
    AnalysisEngine::new(
        Arc::new(JsonProvider { body }),
        Box::new(EmaCrossover::default()),
        Duration::from_secs(300),
    )
}

#[tokio::test]
async fn jump_in_price_is_a_confirmed_bullish_trend() {
    let mut closes = vec![100.0; 25];
    closes.extend([200.0; 5]);
    let engine = engine_for(four_hour_body(&closes));

    let report = engine.analyze(&Symbol::new("bitcoin"), Timeframe::OneDay).await.unwrap();
    assert_eq!(report.bars.len(), 30);
    let first = report.bars[0];
    assert_eq!(first.bar.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    assert!((first.bar.high - 101.0).abs() < 1e-9);
    assert_eq!(first.ema_short, 100.0);

    let analysis = &report.analysis;
    assert_eq!(analysis.trend, TrendLabel::Bullish);
    assert_eq!(analysis.strength, TrendStrength::Confirmed);
    assert!(analysis.recent_bullish_cross);
    assert_eq!(analysis.crossover_periods_ago, Some(5));
}

#[tokio::test]
async fn steady_rise_has_no_recent_crossover() {
    let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let engine = engine_for(four_hour_body(&closes));

    let report = engine.analyze(&Symbol::new("ethereum"), Timeframe::OneDay).await.unwrap();
    assert_eq!(report.analysis.trend, TrendLabel::Bullish);
    assert_eq!(report.analysis.strength, TrendStrength::Base);
    assert_eq!(report.analysis.crossover_periods_ago, None);
    assert!(report.analysis.price_above_ema_short);
}

#[tokio::test]
async fn raw_candles_survive_at_their_native_width() {
    let engine = engine_for(four_hour_body(&[100.0; 30]));
    let report = engine.analyze(&Symbol::new("solana"), Timeframe::FourHours).await.unwrap();
    assert_eq!(report.bars.len(), 180);
    assert_eq!(report.analysis.trend, TrendLabel::Bearish);
}

#[tokio::test]
async fn weekly_buckets_from_a_month_are_insufficient() {
    let engine = engine_for(four_hour_body(&[100.0; 30]));
    let err = engine.analyze(&Symbol::new("bitcoin"), Timeframe::OneWeek).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientData { required: 25, .. }));
}

#[tokio::test]
async fn unusable_bodies_are_fetch_errors() {
    let engine = engine_for(r#"{"error":"coin not found"}"#.to_string());
    let err = engine.analyze(&Symbol::new("nope"), Timeframe::OneDay).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(api_client::Error::ApiError { .. })));

    let engine = engine_for("[[1, 2]]".to_string());
    let err = engine.analyze(&Symbol::new("nope"), Timeframe::OneDay).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(api_client::Error::DeserializationFailed(_))));
}
