// In crates/engine/src/lib.rs

pub mod cache;
pub mod error;

use crate::cache::ResultCache;
use api_client::MarketDataProvider;
use app_config::AssetConfig;
use core_types::{PriceSeries, Symbol, Timeframe, TrendReport};
use std::sync::Arc;
use std::time::Duration;
use strategies::TrendStrategy;
use tokio::sync::Mutex;

pub use error::{Error, Result};

/// Cache key: one entry per asset, raw lookback and bucket width.
pub type CacheKey = (Symbol, u32, Timeframe);

/// Raw history key: timeframes with the same lookback share one fetch.
pub type FetchKey = (Symbol, u32);

/// The outcome of analyzing one configured asset during a cycle.
#[derive(Debug)]
pub struct AssetOutcome {
    pub asset: AssetConfig,
    pub result: Result<Arc<TrendReport>>,
}

/// Drives fetch → resample → analyze for every asset and timeframe the
/// dashboard asks about, and remembers successful results for one TTL.
pub struct AnalysisEngine {
    provider: Arc<dyn MarketDataProvider>,
    strategy: Box<dyn TrendStrategy + Send + Sync>,
    cache: Mutex<ResultCache<CacheKey, Arc<TrendReport>>>,
    raw_cache: Mutex<ResultCache<FetchKey, Arc<PriceSeries>>>,
}

impl AnalysisEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        strategy: Box<dyn TrendStrategy + Send + Sync>,
        cache_ttl: Duration,
    ) -> Self {
        tracing::info!(
            strategy = strategy.name(),
            ttl_secs = cache_ttl.as_secs(),
            "Initializing analysis engine."
        );
        Self {
            provider,
            strategy,
            cache: Mutex::new(ResultCache::new(cache_ttl)),
            raw_cache: Mutex::new(ResultCache::new(cache_ttl)),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Analyzes `symbol` using the timeframe's default lookback.
    pub async fn analyze(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<Arc<TrendReport>> {
        self.analyze_with_lookback(symbol, timeframe.default_lookback_days(), timeframe)
            .await
    }

    /// Runs the full pipeline for one asset, serving from cache when fresh.
    ///
    /// Only successful reports and non-empty fetches are cached; every failure
    /// is returned as-is and recomputed on the next request.
    pub async fn analyze_with_lookback(
        &self,
        symbol: &Symbol,
        lookback_days: u32,
        timeframe: Timeframe,
    ) -> Result<Arc<TrendReport>> {
        let key: CacheKey = (symbol.clone(), lookback_days, timeframe);
        if let Some(report) = self.cache.lock().await.get(&key) {
            tracing::debug!(symbol = %symbol, timeframe = %timeframe, "Serving analysis from cache.");
            return Ok(report);
        }

        // 1. Fetch the raw history.
        let raw = self.fetch(symbol, lookback_days).await?;

        // 2. Aggregate into the requested bucket width.
        let resampled = raw.resample(timeframe);
        let required = self.strategy.min_periods();
        if resampled.len() < required {
            return Err(Error::InsufficientData { periods: resampled.len(), required });
        }

        // 3. Classify.
        let report = Arc::new(self.strategy.analyze(&resampled)?);
        tracing::debug!(
            symbol = %symbol,
            timeframe = %timeframe,
            raw_bars = raw.len(),
            periods = resampled.len(),
            trend = %report.analysis.trend,
            "Analysis complete."
        );

        self.cache.lock().await.insert(key, Arc::clone(&report));
        Ok(report)
    }

    async fn fetch(&self, symbol: &Symbol, lookback_days: u32) -> Result<Arc<PriceSeries>> {
        let key: FetchKey = (symbol.clone(), lookback_days);
        if let Some(raw) = self.raw_cache.lock().await.get(&key) {
            return Ok(raw);
        }

        let raw = self.provider.fetch_ohlc(symbol, lookback_days).await?;
        if raw.is_empty() {
            return Err(Error::NoData(symbol.clone()));
        }
        let raw = Arc::new(raw);
        self.raw_cache.lock().await.insert(key, Arc::clone(&raw));
        Ok(raw)
    }

    /// Analyzes every asset in order. A failing asset is logged and reported
    /// in its own outcome; it never stops the cycle.
    pub async fn run_cycle(&self, assets: &[AssetConfig], timeframe: Timeframe) -> Vec<AssetOutcome> {
        let mut outcomes = Vec::with_capacity(assets.len());
        for asset in assets {
            let result = self.analyze(&asset.symbol(), timeframe).await;
            if let Err(e) = &result {
                tracing::warn!(asset = %asset.name, timeframe = %timeframe, error = %e, "No usable data for asset.");
            }
            outcomes.push(AssetOutcome { asset: asset.clone(), result });
        }
        outcomes
    }

    /// Forgets every cached report.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        self.raw_cache.lock().await.clear();
        tracing::info!("Analysis cache cleared.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use core_types::{PriceBar, PriceSeries, TrendLabel};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strategies::EmaCrossover;

    /// Serves canned daily closes per symbol and counts fetches.
    #[derive(Default)]
    struct FakeProvider {
        closes: HashMap<String, Vec<f64>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn with(mut self, id: &str, closes: Vec<f64>) -> Self {
            self.closes.insert(id.to_string(), closes);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn fetch_ohlc(&self, symbol: &Symbol, _lookback_days: u32) -> api_client::Result<PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let Some(closes) = self.closes.get(symbol.as_str()) else {
                return Err(api_client::Error::ApiError { code: 404, msg: "coin not found".into() });
            };
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let bars = closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PriceBar::new(start + ChronoDuration::days(i as i64), c, c, c, c))
                .collect();
            Ok(PriceSeries::new(bars).unwrap())
        }
    }

    /// Counts how often the strategy is asked to classify.
    struct CountingStrategy {
        inner: EmaCrossover,
        calls: Arc<AtomicUsize>,
    }

    impl TrendStrategy for CountingStrategy {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn min_periods(&self) -> usize {
            self.inner.min_periods()
        }

        fn analyze(&self, series: &PriceSeries) -> strategies::Result<TrendReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.analyze(series)
        }
    }

    fn engine(provider: FakeProvider) -> (Arc<FakeProvider>, Arc<AtomicUsize>, AnalysisEngine) {
        let provider = Arc::new(provider);
        let calls = Arc::new(AtomicUsize::new(0));
        let strategy = CountingStrategy { inner: EmaCrossover::default(), calls: Arc::clone(&calls) };
        let engine = AnalysisEngine::new(
            provider.clone(),
            Box::new(strategy),
            Duration::from_secs(300),
        );
        (provider, calls, engine)
    }

    fn asset(name: &str, id: &str) -> AssetConfig {
        AssetConfig { name: name.into(), id: id.into() }
    }

    fn golden_cross() -> Vec<f64> {
        let mut closes = vec![100.0; 25];
        closes.extend([200.0; 5]);
        closes
    }

    #[tokio::test]
    async fn successful_analysis_is_cached() {
        let (provider, strategy_calls, engine) = engine(FakeProvider::default().with("bitcoin", golden_cross()));
        let symbol = Symbol::new("bitcoin");

        let first = engine.analyze(&symbol, Timeframe::OneDay).await.unwrap();
        assert_eq!(first.analysis.trend, TrendLabel::Bullish);
        assert_eq!(first.bars.len(), 30);

        let second = engine.analyze(&symbol, Timeframe::OneDay).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.calls(), 1);
        assert_eq!(strategy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeframes_with_the_same_lookback_share_one_fetch() {
        let (provider, strategy_calls, engine) = engine(FakeProvider::default().with("bitcoin", golden_cross()));
        let symbol = Symbol::new("bitcoin");

        for timeframe in [Timeframe::FourHours, Timeframe::SixHours, Timeframe::TwelveHours] {
            engine.analyze(&symbol, timeframe).await.unwrap();
        }
        assert_eq!(provider.calls(), 1);
        assert_eq!(strategy_calls.load(Ordering::SeqCst), 3);

        engine.analyze_with_lookback(&symbol, 90, Timeframe::FourHours).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn clearing_the_cache_forces_a_refetch() {
        let (provider, _, engine) = engine(FakeProvider::default().with("bitcoin", golden_cross()));
        let symbol = Symbol::new("bitcoin");

        engine.analyze(&symbol, Timeframe::OneDay).await.unwrap();
        engine.clear_cache().await;
        engine.analyze(&symbol, Timeframe::OneDay).await.unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn empty_history_is_no_data_and_skips_analysis() {
        let (_, strategy_calls, engine) = engine(FakeProvider::default().with("solana", vec![]));
        let err = engine.analyze(&Symbol::new("solana"), Timeframe::OneDay).await.unwrap_err();
        assert!(matches!(err, Error::NoData(ref s) if s.as_str() == "solana"));
        assert_eq!(strategy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_history_is_insufficient_on_every_request() {
        let (_, strategy_calls, engine) = engine(FakeProvider::default().with("ethereum", vec![100.0; 24]));
        let symbol = Symbol::new("ethereum");

        for _ in 0..2 {
            let err = engine.analyze(&symbol, Timeframe::OneDay).await.unwrap_err();
            assert!(matches!(err, Error::InsufficientData { periods: 24, required: 25 }));
        }
        assert_eq!(strategy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_and_failed_fetches_are_retried() {
        let (provider, _, engine) = engine(FakeProvider::default().with("solana", vec![]));
        for _ in 0..2 {
            engine.analyze(&Symbol::new("solana"), Timeframe::OneDay).await.unwrap_err();
            engine.analyze(&Symbol::new("ghost"), Timeframe::OneDay).await.unwrap_err();
        }
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn sufficiency_is_checked_after_resampling() {
        // 30 daily bars are plenty at 1D but only 5 weekly buckets.
        let (_, _, engine) = engine(FakeProvider::default().with("bitcoin", golden_cross()));
        let err = engine.analyze(&Symbol::new("bitcoin"), Timeframe::OneWeek).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientData { periods, required: 25 } if periods <= 6));
    }

    #[tokio::test]
    async fn fetch_errors_are_propagated() {
        let (_, _, engine) = engine(FakeProvider::default());
        let err = engine.analyze(&Symbol::new("nope"), Timeframe::OneDay).await.unwrap_err();
        assert!(matches!(err, Error::Fetch(api_client::Error::ApiError { code: 404, .. })));
    }

    #[tokio::test]
    async fn one_failing_asset_does_not_stop_the_cycle() {
        let provider = FakeProvider::default()
            .with("bitcoin", golden_cross())
            .with("solana", vec![]);
        let (_, _, engine) = engine(provider);
        let assets = [asset("Bitcoin", "bitcoin"), asset("Solana", "solana"), asset("Ghost", "ghost")];

        let outcomes = engine.run_cycle(&assets, Timeframe::OneDay).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].asset.name, "Bitcoin");
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(Error::NoData(_))));
        assert!(matches!(outcomes[2].result, Err(Error::Fetch(_))));
    }
}
