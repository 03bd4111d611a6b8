use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_CMC_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
pub const DEFAULT_FEAR_GREED_URL: &str = "https://api.alternative.me/fng/";
pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

const DEFAULT_STOCK_SYMBOLS: &[&str] = &["NVDA", "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA"];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Upstream base URLs. Overridable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub cmc_base_url: String,
    pub fear_greed_url: String,
    pub finnhub_base_url: String,
    pub telegram_api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            cmc_base_url: DEFAULT_CMC_BASE_URL.to_string(),
            fear_greed_url: DEFAULT_FEAR_GREED_URL.to_string(),
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub telegram_bot_token: String,
    pub channel_id: String,
    pub cmc_api_key: String,
    pub finnhub_api_key: Option<String>,
    pub port: u16,
    pub metrics_port: Option<u16>,
    pub digest_interval: Duration,
    pub digest_jitter: Duration,
    pub retry_backoff: Duration,
    pub http_timeout: Duration,
    pub crypto_limit: u32,
    pub stock_symbols: Vec<String>,
    pub dry_run: bool,
    pub endpoints: Endpoints,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let secs = |key: &'static str, default: u64| {
            parse_or(key, get(key), default).map(Duration::from_secs)
        };

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            cmc_base_url: get("CMC_BASE_URL").unwrap_or(defaults.cmc_base_url),
            fear_greed_url: get("FEAR_GREED_URL").unwrap_or(defaults.fear_greed_url),
            finnhub_base_url: get("FINNHUB_BASE_URL").unwrap_or(defaults.finnhub_base_url),
            telegram_api_url: get("TELEGRAM_API_URL").unwrap_or(defaults.telegram_api_url),
        };

        let stock_symbols = match get("STOCK_SYMBOLS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_STOCK_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };

        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => Some(parse_value("METRICS_PORT", raw)?),
            None => None,
        };

        let digest_interval = secs("DIGEST_INTERVAL_SECS", 3_600)?;
        if digest_interval.is_zero() {
            return Err(invalid("DIGEST_INTERVAL_SECS", &digest_interval));
        }
        let retry_backoff = secs("RETRY_BACKOFF_SECS", 300)?;
        if retry_backoff.is_zero() || retry_backoff > digest_interval {
            return Err(invalid("RETRY_BACKOFF_SECS", &retry_backoff));
        }

        Ok(Self {
            log_level: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            channel_id: required("CHANNEL_ID")?,
            cmc_api_key: required("CMC_API_KEY")?,
            finnhub_api_key: get("FINNHUB_API_KEY"),
            port: parse_or("PORT", get("PORT"), 10_000)?,
            metrics_port,
            digest_interval,
            digest_jitter: secs("DIGEST_JITTER_SECS", 0)?,
            retry_backoff,
            http_timeout: secs("HTTP_TIMEOUT_SECS", 10)?,
            crypto_limit: parse_or("CRYPTO_LIMIT", get("CRYPTO_LIMIT"), 100)?,
            stock_symbols,
            dry_run: parse_or("DRY_RUN", get("DRY_RUN"), false)?,
            endpoints,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse_value(key, raw),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: &Duration) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.as_secs().to_string(),
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}
