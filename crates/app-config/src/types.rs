// In crates/app-config/src/types.rs

use core_types::{Symbol, Timeframe};
use serde::Deserialize;
use strategies::types::EmaCrossoverSettings;

// Define the container for all strategy settings
#[derive(Deserialize, Debug, Default, Clone)]
pub struct StrategySettings {
    // Overrides for the EMA crossover analyzer; defaults apply when absent
    pub ema_crossover: Option<EmaCrossoverSettings>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the market-data provider.
    pub coingecko: CoinGeckoSettings,
    pub server: ServerSettings,
    /// Which assets the dashboard tracks and how it refreshes.
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub strategies: StrategySettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CoinGeckoSettings {
    /// Optional Pro API key. Switches requests to the pro endpoint when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// The public (rate-limited) REST base URL.
    pub public_base_url: String,
    /// The REST base URL used with an API key.
    pub pro_base_url: String,
    /// Quote currency for all prices (e.g., "usd").
    pub vs_currency: String,
    /// Per-request timeout. No timeout when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl CoinGeckoSettings {
    /// The API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// A tracked asset: display name plus provider identifier.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub name: String,
    pub id: String,
}

impl AssetConfig {
    pub fn symbol(&self) -> Symbol {
        Symbol::new(self.id.clone())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DashboardSettings {
    pub assets: Vec<AssetConfig>,
    #[serde(default)]
    pub default_timeframe: Timeframe,
    /// How long an analysis result is reused before refetching.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Interval used by the dashboard's auto-refresh toggle.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_secs: u64,
}

impl DashboardSettings {
    pub fn find_asset(&self, key: &str) -> Option<&AssetConfig> {
        self.assets
            .iter()
            .find(|a| a.id.eq_ignore_ascii_case(key) || a.name.eq_ignore_ascii_case(key))
    }
}

/// Helper functions for serde defaults
fn default_cache_ttl() -> u64 { 300 }
fn default_auto_refresh() -> u64 { 30 }
