use crate::market_data::types::MarketSnapshot;

/// Scalars carried from one successful cycle to the next, used only to
/// phrase deltas. Lives in memory; a restart begins empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviousPollState {
    pub btc_price: Option<f64>,
    pub eth_price: Option<f64>,
    pub sentiment_score: Option<u8>,
}

impl PreviousPollState {
    /// State to carry forward after publishing `snapshot`.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        Self {
            btc_price: snapshot.asset("BTC").map(|a| a.price),
            eth_price: snapshot.asset("ETH").map(|a| a.price),
            sentiment_score: snapshot.sentiment.as_ref().map(|s| s.score),
        }
    }
}
