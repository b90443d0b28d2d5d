// In crates/app-config/src/lib.rs

use config::{Config, Environment, File, FileFormat};
use std::collections::HashSet;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AssetConfig, CoinGeckoSettings, DashboardSettings, ServerSettings, Settings};

/// Built-in defaults. Every file or variable layered on top may override them.
const DEFAULTS: &str = r#"
[app]
environment = "development"
log_level = "info"

[coingecko]
public_base_url = "https://api.coingecko.com/api/v3"
pro_base_url = "https://pro-api.coingecko.com/api/v3"
vs_currency = "usd"

[server]
host = "127.0.0.1"
port = 8501

[dashboard]
default_timeframe = "1D"
cache_ttl_secs = 300
auto_refresh_secs = 30
assets = [
    { name = "Bitcoin", id = "bitcoin" },
    { name = "Ethereum", id = "ethereum" },
    { name = "Solana", id = "solana" },
]
"#;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Starts from the built-in defaults.
/// 2. Merges an optional `config/base.toml`.
/// 3. Merges an optional environment-specific file (e.g., `config/development.toml`).
/// 4. Merges environment variables (e.g., `APP__SERVER__PORT=9000`).
/// 5. Applies `COINGECKO_API_KEY`, if set, as the provider API key.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    let api_key = std::env::var("COINGECKO_API_KEY").ok();
    load_settings_from(Path::new("config"), &environment, api_key)
}

/// Same as [`load_settings`], reading files from `config_dir` with an explicit
/// environment name and API key override.
pub fn load_settings_from(
    config_dir: &Path,
    environment: &str,
    api_key: Option<String>,
) -> Result<Settings> {
    let settings = Config::builder()
        .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
        .add_source(File::from(config_dir.join("base")).required(false))
        .add_source(File::from(config_dir.join(environment)).required(false))
        // The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .set_override("app.environment", environment)?
        .set_override_option("coingecko.api_key", api_key)?
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;
    validate(&settings)?;

    Ok(settings)
}

fn validate(settings: &Settings) -> Result<()> {
    let assets = &settings.dashboard.assets;
    if assets.is_empty() {
        return Err(Error::Invalid("dashboard.assets must list at least one asset".into()));
    }
    let mut seen = HashSet::new();
    for asset in assets {
        if asset.id.trim().is_empty() {
            return Err(Error::Invalid(format!("asset '{}' has an empty id", asset.name)));
        }
        if !seen.insert(asset.id.to_lowercase()) {
            return Err(Error::Invalid(format!("duplicate asset id '{}'", asset.id)));
        }
    }
    Ok(())
}
