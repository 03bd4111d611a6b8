use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, info};

use crate::market_data::fetcher::{Endpoint, Fetcher, join_url};
use crate::market_data::types::{Quote, valid_price};

const QUOTE_PATH: &str = "/api/v1/quote";

/// Finnhub `/quote` body. Unknown symbols come back as zeros and nulls.
#[derive(Debug, Deserialize)]
struct RawQuote {
    /// current price
    c: Option<f64>,
    /// percent change
    dp: Option<f64>,
    /// previous close
    pc: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct Finnhub {
    base_url: String,
    api_key: String,
}

impl Finnhub {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn quote(&self, fetcher: &Fetcher, symbol: &str) -> Option<Quote> {
        let endpoint = Endpoint::get("finnhub_quote", join_url(&self.base_url, QUOTE_PATH))
            .query("symbol", symbol)
            .header("X-Finnhub-Token", self.api_key.as_str());

        let quote = fetcher
            .fetch(&endpoint, |raw: RawQuote| into_quote(symbol, raw))
            .await?;

        debug!(
            symbol,
            price = quote.price,
            change_percent = ?quote.change_percent,
            "equity quote received"
        );
        Some(quote)
    }

    /// One request per symbol, issued concurrently. Output keeps the input
    /// order and omits symbols that failed.
    pub async fn quotes(&self, fetcher: &Fetcher, symbols: &[String]) -> Vec<Quote> {
        let results = join_all(symbols.iter().map(|s| self.quote(fetcher, s))).await;
        let quotes: Vec<Quote> = results.into_iter().flatten().collect();

        info!(requested = symbols.len(), received = quotes.len(), "equity quotes received");
        quotes
    }
}

fn into_quote(symbol: &str, raw: RawQuote) -> Option<Quote> {
    let price = valid_price(raw.c)?;

    // dp is reported as 0 (or null) when Finnhub has no change figure.
    let change_percent = match raw.dp.filter(|dp| dp.is_finite()) {
        Some(dp) if dp != 0.0 => Some(dp),
        reported => match valid_price(raw.pc) {
            Some(prev) => Some((price - prev) / prev * 100.0),
            None => reported,
        },
    };

    Some(Quote {
        symbol: symbol.to_string(),
        price,
        change_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(c: Option<f64>, dp: Option<f64>, pc: Option<f64>) -> RawQuote {
        RawQuote { c, dp, pc }
    }

    #[test]
    fn reported_percent_is_kept() {
        let q = into_quote("NVDA", raw(Some(120.0), Some(2.0), Some(117.6))).unwrap();
        assert_eq!(q.change_percent, Some(2.0));
    }

    #[test]
    fn zero_percent_is_recomputed_from_previous_close() {
        let q = into_quote("AAPL", raw(Some(110.0), Some(0.0), Some(100.0))).unwrap();
        let pct = q.change_percent.unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_price_is_discarded() {
        assert!(into_quote("NOPE", raw(Some(0.0), None, Some(0.0))).is_none());
        assert!(into_quote("NOPE", raw(None, None, None)).is_none());
        assert!(into_quote("NOPE", raw(Some(-3.0), None, None)).is_none());
    }

    #[test]
    fn missing_percent_without_previous_close_stays_missing() {
        let q = into_quote("MSFT", raw(Some(400.0), None, None)).unwrap();
        assert_eq!(q.change_percent, None);
    }
}
