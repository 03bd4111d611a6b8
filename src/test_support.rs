use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::config::Config;

pub const CMC_KEY: &str = "test-cmc-key";
pub const FINNHUB_KEY: &str = "test-finnhub-key";

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
pub struct Upstream {
    /// Serve 503 from the fear & greed route.
    pub fear_greed_down: bool,
    /// Add this much to the BTC price on every listings call.
    pub btc_step: f64,
    /// Hold every listings response this long.
    pub latency: Duration,
    pub listings_calls: Arc<AtomicUsize>,
}

impl Upstream {
    pub fn fear_greed_down() -> Self {
        Self {
            fear_greed_down: true,
            ..Default::default()
        }
    }

    pub fn with_btc_step(step: f64) -> Self {
        Self {
            btc_step: step,
            ..Default::default()
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn listings_calls(&self) -> usize {
        self.listings_calls.load(Ordering::SeqCst)
    }
}

fn cmc_authorised(headers: &HeaderMap) -> bool {
    headers
        .get("X-CMC_PRO_API_KEY")
        .is_some_and(|v| v == CMC_KEY)
}

async fn listings(State(up): State<Upstream>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !cmc_authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": {"error_code": 1002}})));
    }
    if !up.latency.is_zero() {
        tokio::time::sleep(up.latency).await;
    }
    let call = up.listings_calls.fetch_add(1, Ordering::SeqCst) as f64;
    let btc = 65_000.0 + call * up.btc_step;

    (
        StatusCode::OK,
        Json(json!({"data": [
            {"symbol": "BTC", "name": "Bitcoin", "quote": {"USD": {"price": btc, "percent_change_24h": 1.5, "market_cap": 1.28e12}}},
            {"symbol": "ETH", "name": "Ethereum", "quote": {"USD": {"price": 3000.0, "percent_change_24h": -2.0}}},
            {"symbol": "USDT", "name": "Tether", "quote": {"USD": {"price": 1.0, "percent_change_24h": 25.0}}},
            {"symbol": "SOL", "name": "Solana", "quote": {"USD": {"price": 150.0, "percent_change_24h": 12.0}}},
            {"symbol": "DOGE", "name": "Dogecoin", "quote": {"USD": {"price": 0.15, "percent_change_24h": -9.0}}}
        ]})),
    )
}

async fn global_metrics(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !cmc_authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({"data": {
            "btc_dominance": 54.2,
            "eth_dominance": 17.1,
            "quote": {"USD": {"total_market_cap": 2_345_000_000_000.0_f64, "total_volume_24h": 91_000_000_000.0_f64}}
        }})),
    )
}

async fn gold(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(q.get("symbol").map(String::as_str), Some("PAXG"));
    Json(json!({"data": {"PAXG": {"symbol": "PAXG", "quote": {"USD": {"price": 2400.5, "percent_change_24h": 0.3}}}}}))
}

async fn fear_greed(State(up): State<Upstream>) -> (StatusCode, Json<Value>) {
    if up.fear_greed_down {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({"data": [{"value": "28", "value_classification": "Fear"}]})),
    )
}

async fn finnhub_quote(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if headers.get("X-Finnhub-Token").is_none_or(|v| v != FINNHUB_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid token"})));
    }
    let body = match q.get("symbol").map(String::as_str) {
        Some("NVDA") => json!({"c": 120.0, "d": 2.4, "dp": 2.0, "pc": 117.6}),
        Some("AAPL") => json!({"c": 110.0, "d": null, "dp": 0, "pc": 100.0}),
        // Finnhub's answer for an unknown symbol.
        _ => json!({"c": 0, "d": null, "dp": null, "pc": 0}),
    };
    (StatusCode::OK, Json(body))
}

/// Stands in for CoinMarketCap, alternative.me and Finnhub on one port.
pub async fn spawn_upstream(upstream: Upstream) -> String {
    let router = Router::new()
        .route("/v1/cryptocurrency/listings/latest", get(listings))
        .route("/v1/global-metrics/quotes/latest", get(global_metrics))
        .route("/v1/cryptocurrency/quotes/latest", get(gold))
        .route("/fng/", get(fear_greed))
        .route("/api/v1/quote", get(finnhub_quote))
        .with_state(upstream);
    spawn_server(router).await
}

/// Config wired to a mock upstream at `base`, in dry-run mode.
pub fn config_for(base: &str) -> Config {
    let fng = format!("{base}/fng/");
    let pairs: HashMap<&str, String> = HashMap::from([
        ("TELEGRAM_BOT_TOKEN", "TEST".to_string()),
        ("CHANNEL_ID", "@digest".to_string()),
        ("CMC_API_KEY", CMC_KEY.to_string()),
        ("FINNHUB_API_KEY", FINNHUB_KEY.to_string()),
        ("STOCK_SYMBOLS", "NVDA,BOGUS,AAPL".to_string()),
        ("HTTP_TIMEOUT_SECS", "5".to_string()),
        ("DRY_RUN", "true".to_string()),
        ("CMC_BASE_URL", base.to_string()),
        ("FINNHUB_BASE_URL", base.to_string()),
        ("FEAR_GREED_URL", fng),
        ("TELEGRAM_API_URL", base.to_string()),
    ]);

    Config::from_lookup(|key| pairs.get(key).cloned()).unwrap()
}
