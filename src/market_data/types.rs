/// Symbols that track the dollar and are never ranked.
pub const STABLECOINS: &[&str] = &["USDT", "USDC", "BUSD", "DAI", "UST"];

#[derive(Debug, Clone, PartialEq)]
pub struct CryptoAsset {
    pub symbol: String,
    pub price: f64,
    pub percent_change_24h: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalMetrics {
    pub total_market_cap: Option<f64>,
    pub total_volume_24h: Option<f64>,
    pub btc_dominance: Option<f64>,
    pub eth_dominance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub score: u8,
    pub classification: String,
}

impl Sentiment {
    /// Used whenever the index cannot be fetched.
    pub fn neutral() -> Self {
        Self {
            score: 50,
            classification: "Neutral".to_string(),
        }
    }
}

/// Equity or commodity quote. Price is always positive.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_percent: Option<f64>,
}

/// Everything one poll cycle gathered.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub assets: Vec<CryptoAsset>,
    pub global: Option<GlobalMetrics>,
    pub sentiment: Option<Sentiment>,
    pub gold: Option<Quote>,
    pub equities: Vec<Quote>,
}

impl MarketSnapshot {
    pub fn asset(&self, symbol: &str) -> Option<&CryptoAsset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }
}

pub fn is_stablecoin(symbol: &str) -> bool {
    STABLECOINS.contains(&symbol)
}

/// Keeps only finite, strictly positive prices.
pub fn valid_price(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}
