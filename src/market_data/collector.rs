use std::time::Instant;

use tracing::{info, warn};

use crate::config::Config;
use crate::market_data::adapters::alternative_me::FearGreedIndex;
use crate::market_data::adapters::coinmarketcap::CoinMarketCap;
use crate::market_data::adapters::finnhub::Finnhub;
use crate::market_data::fetcher::Fetcher;
use crate::market_data::types::MarketSnapshot;

/// Gathers one `MarketSnapshot` from every configured source.
#[derive(Clone)]
pub struct SnapshotCollector {
    fetcher: Fetcher,
    cmc: CoinMarketCap,
    fear_greed: FearGreedIndex,
    finnhub: Option<Finnhub>,
    crypto_limit: u32,
    stock_symbols: Vec<String>,
}

impl SnapshotCollector {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let endpoints = &config.endpoints;

        let finnhub = match &config.finnhub_api_key {
            Some(key) => Some(Finnhub::new(endpoints.finnhub_base_url.as_str(), key.as_str())),
            None => {
                warn!("FINNHUB_API_KEY not set, equity quotes disabled");
                None
            }
        };

        Ok(Self {
            fetcher: Fetcher::new(config.http_timeout)?,
            cmc: CoinMarketCap::new(endpoints.cmc_base_url.as_str(), config.cmc_api_key.as_str()),
            fear_greed: FearGreedIndex::new(endpoints.fear_greed_url.as_str()),
            finnhub,
            crypto_limit: config.crypto_limit,
            stock_symbols: config.stock_symbols.clone(),
        })
    }

    /// Fetches all sources concurrently. Never fails: each source falls back
    /// to its empty value on its own.
    pub async fn collect(&self) -> MarketSnapshot {
        let started = Instant::now();
        let fetcher = &self.fetcher;

        let equities = async {
            match &self.finnhub {
                Some(finnhub) => finnhub.quotes(fetcher, &self.stock_symbols).await,
                None => Vec::new(),
            }
        };

        let (assets, global, sentiment, gold, equities) = tokio::join!(
            self.cmc.listings(fetcher, self.crypto_limit),
            self.cmc.global_metrics(fetcher),
            self.fear_greed.latest(fetcher),
            self.cmc.gold_quote(fetcher),
            equities,
        );

        info!(
            assets = assets.len(),
            global = global.is_some(),
            gold = gold.is_some(),
            equities = equities.len(),
            sentiment = ?sentiment.as_ref().map(|s| s.score),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "market snapshot collected"
        );

        MarketSnapshot {
            assets,
            global,
            sentiment,
            gold,
            equities,
        }
    }
}
