use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::market_data::fetcher::{Endpoint, Envelope, Fetcher, join_url};
use crate::market_data::types::{CryptoAsset, GlobalMetrics, Quote, valid_price};

const LISTINGS_PATH: &str = "/v1/cryptocurrency/listings/latest";
const GLOBAL_METRICS_PATH: &str = "/v1/global-metrics/quotes/latest";
const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";

/// Tokenised gold, used as the gold price proxy.
pub const GOLD_SYMBOL: &str = "PAXG";

#[derive(Debug, Deserialize)]
struct RawAsset {
    symbol: String,
    #[serde(default)]
    quote: RawQuotes,
}

#[derive(Debug, Default, Deserialize)]
struct RawQuotes {
    #[serde(rename = "USD")]
    usd: Option<RawUsd>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUsd {
    price: Option<f64>,
    percent_change_24h: Option<f64>,
    total_market_cap: Option<f64>,
    total_volume_24h: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGlobal {
    btc_dominance: Option<f64>,
    eth_dominance: Option<f64>,
    #[serde(default)]
    quote: RawQuotes,
}

#[derive(Clone, Debug)]
pub struct CoinMarketCap {
    base_url: String,
    api_key: String,
}

impl CoinMarketCap {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, source: &'static str, path: &str) -> Endpoint {
        Endpoint::get(source, join_url(&self.base_url, path))
            .header("X-CMC_PRO_API_KEY", self.api_key.as_str())
            .header("Accept", "application/json")
    }

    /// Top `limit` assets by market cap. Empty on any failure.
    pub async fn listings(&self, fetcher: &Fetcher, limit: u32) -> Vec<CryptoAsset> {
        let endpoint = self
            .endpoint("cmc_listings", LISTINGS_PATH)
            .query("limit", limit)
            .query("convert", "USD");

        let assets = fetcher
            .fetch(&endpoint, |env: Envelope<Vec<Value>>| Some(parse_listings(env.data)))
            .await
            .unwrap_or_default();

        info!(count = assets.len(), "crypto listings received");
        assets
    }

    pub async fn global_metrics(&self, fetcher: &Fetcher) -> Option<GlobalMetrics> {
        let endpoint = self.endpoint("cmc_global", GLOBAL_METRICS_PATH);
        fetcher
            .fetch(&endpoint, |env: Envelope<RawGlobal>| Some(parse_global(env.data)))
            .await
    }

    pub async fn gold_quote(&self, fetcher: &Fetcher) -> Option<Quote> {
        let endpoint = self
            .endpoint("cmc_gold", QUOTES_PATH)
            .query("symbol", GOLD_SYMBOL)
            .query("convert", "USD");

        fetcher
            .fetch(&endpoint, |env: Envelope<HashMap<String, Value>>| {
                parse_gold(env.data)
            })
            .await
    }
}

/// Entries that fail to decode or carry no usable price are skipped individually.
fn parse_listings(raw: Vec<Value>) -> Vec<CryptoAsset> {
    let total = raw.len();
    let assets: Vec<CryptoAsset> = raw
        .into_iter()
        .filter_map(|v| serde_json::from_value::<RawAsset>(v).ok())
        .filter_map(into_asset)
        .collect();

    if assets.len() < total {
        debug!(dropped = total - assets.len(), "skipped malformed listings");
    }
    assets
}

fn into_asset(raw: RawAsset) -> Option<CryptoAsset> {
    let usd = raw.quote.usd.unwrap_or_default();
    Some(CryptoAsset {
        price: valid_price(usd.price)?,
        symbol: raw.symbol,
        percent_change_24h: usd.percent_change_24h.filter(|c| c.is_finite()),
    })
}

fn parse_global(raw: RawGlobal) -> GlobalMetrics {
    let usd = raw.quote.usd.unwrap_or_default();
    GlobalMetrics {
        total_market_cap: usd.total_market_cap,
        total_volume_24h: usd.total_volume_24h,
        btc_dominance: raw.btc_dominance,
        eth_dominance: raw.eth_dominance,
    }
}

fn parse_gold(mut data: HashMap<String, Value>) -> Option<Quote> {
    let raw = data.remove(GOLD_SYMBOL)?;
    let asset = into_asset(serde_json::from_value::<RawAsset>(raw).ok()?)?;

    Some(Quote {
        symbol: asset.symbol,
        price: asset.price,
        change_percent: asset.percent_change_24h,
    })
}
