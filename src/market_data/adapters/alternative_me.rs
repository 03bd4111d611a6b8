use serde::Deserialize;
use tracing::warn;

use crate::market_data::fetcher::{Endpoint, Envelope, Fetcher};
use crate::market_data::types::Sentiment;

#[derive(Debug, Deserialize)]
struct RawIndex {
    value: NumberOrString,
    value_classification: Option<String>,
}

/// The index publishes its value as a JSON string; accept a number too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Crypto fear & greed index from alternative.me.
#[derive(Clone, Debug)]
pub struct FearGreedIndex {
    url: String,
}

impl FearGreedIndex {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Latest reading. `None` when the index is unavailable; the digest then
    /// shows the neutral reading.
    pub async fn latest(&self, fetcher: &Fetcher) -> Option<Sentiment> {
        let endpoint = Endpoint::get("fear_greed", self.url.as_str());

        let sentiment = fetcher.fetch(&endpoint, parse_index).await;
        if sentiment.is_none() {
            warn!("fear & greed index unavailable");
        }
        sentiment
    }
}

fn parse_index(env: Envelope<Vec<RawIndex>>) -> Option<Sentiment> {
    let first = env.data.into_iter().next()?;
    let value = first.value.as_f64().filter(|v| (0.0..=100.0).contains(v))?;
    let score = value.round() as u8;

    let classification = first
        .value_classification
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| classify(score).to_string());

    Some(Sentiment {
        score,
        classification,
    })
}

/// Label used by the index for a score when the upstream omits it.
pub fn classify(score: u8) -> &'static str {
    match score {
        0..=24 => "Extreme Fear",
        25..=44 => "Fear",
        45..=54 => "Neutral",
        55..=74 => "Greed",
        _ => "Extreme Greed",
    }
}
