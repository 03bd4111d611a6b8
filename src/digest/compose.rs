use chrono::{DateTime, Utc};

use super::format::{
    change_emoji, escape_html, format_dominance, format_percent, format_price, format_usd_compact,
    sentiment_emoji, trend_dot,
};
use super::rank::{top_gainers, top_losers};
use crate::market_data::types::{CryptoAsset, MarketSnapshot, Quote, Sentiment};
use crate::state::poll_state::PreviousPollState;

/// Entries shown in each of the gainers/losers sections.
pub const TOP_N: usize = 5;

/// A price move smaller than this (percent of the previous price) is not narrated.
pub const PRICE_DELTA_THRESHOLD_PCT: f64 = 0.5;

/// A sentiment move of this many points or fewer is not narrated.
pub const SENTIMENT_DELTA_THRESHOLD: u8 = 5;

/// Shown in their own section and kept out of the rankings.
const LEADERS: &[Leader] = &[
    Leader { symbol: "BTC", icon: "₿", title: "BITCOIN" },
    Leader { symbol: "ETH", icon: "🔷", title: "ETHEREUM" },
];

const UNAVAILABLE: &str = "❌ Crypto market data is unavailable right now. The next digest will follow on schedule.";

struct Leader {
    symbol: &'static str,
    icon: &'static str,
    title: &'static str,
}

#[derive(Debug, Clone)]
pub struct Digest {
    pub text: String,
    /// State to carry into the next cycle once this digest is published.
    pub next_state: PreviousPollState,
}

/// Renders the digest for one cycle. Pure: the clock is an argument and
/// nothing is fetched or sent.
pub fn compose(snapshot: &MarketSnapshot, previous: &PreviousPollState, now: DateTime<Utc>) -> Digest {
    if snapshot.assets.is_empty() {
        return Digest {
            text: UNAVAILABLE.to_string(),
            next_state: previous.clone(),
        };
    }

    let sentiment = snapshot.sentiment.clone().unwrap_or_else(Sentiment::neutral);

    let mut text = String::from("🔥 <b>MARKET DIGEST</b> 🔥\n\n");
    text.push_str(&overview_section(snapshot, &sentiment, previous));
    text.push_str(&leaders_section(snapshot, previous));
    text.push_str(&movers_section(snapshot));
    text.push_str(&traditional_section(snapshot));
    text.push_str(&format!("\n⏰ Updated: {} UTC\n", now.format("%d.%m.%Y %H:%M")));
    text.push_str("\n💎 <b>Market Digest</b>: your daily guide to the markets");

    Digest {
        text,
        next_state: PreviousPollState::from_snapshot(snapshot),
    }
}

fn overview_section(snapshot: &MarketSnapshot, sentiment: &Sentiment, previous: &PreviousPollState) -> String {
    let mut out = String::from("📊 <b>MARKET OVERVIEW</b>\n");

    if let Some(global) = &snapshot.global {
        out.push_str(&format!("• Market cap: {}\n", format_usd_compact(global.total_market_cap)));
        out.push_str(&format!("• 24h volume: {}\n", format_usd_compact(global.total_volume_24h)));
        out.push_str(&format!("• BTC dominance: {}\n", format_dominance(global.btc_dominance)));
        out.push_str(&format!("• ETH dominance: {}\n", format_dominance(global.eth_dominance)));
    }

    out.push_str(&format!(
        "• {} Fear & Greed index: <b>{}</b> ({})\n",
        sentiment_emoji(sentiment.score),
        sentiment.score,
        escape_html(&sentiment.classification),
    ));

    // Only a live reading is compared; the neutral fallback says nothing about movement.
    if let Some(live) = &snapshot.sentiment {
        if let Some(line) = sentiment_delta(live.score, previous.sentiment_score) {
            out.push_str(&line);
        }
    }

    out.push('\n');
    out
}

fn leaders_section(snapshot: &MarketSnapshot, previous: &PreviousPollState) -> String {
    let mut out = String::from("👑 <b>MARKET LEADERS</b>\n");

    for leader in LEADERS {
        let Some(asset) = snapshot.asset(leader.symbol) else {
            continue;
        };
        out.push_str(&format!("{} <b>{}</b>\n", leader.icon, leader.title));
        out.push_str(&format!(
            "  {} | {} {}%\n",
            format_price(Some(asset.price)),
            trend_dot(asset.percent_change_24h),
            format_percent(asset.percent_change_24h),
        ));

        let before = match leader.symbol {
            "BTC" => previous.btc_price,
            "ETH" => previous.eth_price,
            _ => None,
        };
        if let Some(line) = price_delta(asset.price, before) {
            out.push_str(&line);
        }
    }

    out.push('\n');
    out
}

fn movers_section(snapshot: &MarketSnapshot) -> String {
    let exclude: Vec<&str> = LEADERS.iter().map(|l| l.symbol).collect();
    let gainers = top_gainers(&snapshot.assets, &exclude, TOP_N);
    let losers = top_losers(&snapshot.assets, &exclude, TOP_N);

    let mut out = String::new();
    if !gainers.is_empty() {
        out.push_str("🚀 <b>TOP GAINERS (24h)</b>\n");
        for asset in gainers {
            out.push_str(&mover_line(asset));
        }
        out.push('\n');
    }
    if !losers.is_empty() {
        out.push_str("💀 <b>TOP LOSERS (24h)</b>\n");
        for asset in losers {
            out.push_str(&mover_line(asset));
        }
        out.push('\n');
    }
    out
}

fn mover_line(asset: &CryptoAsset) -> String {
    format!(
        "{} <b>{}</b>\n  {} | {} {}%\n",
        change_emoji(asset.percent_change_24h),
        escape_html(&asset.symbol),
        format_price(Some(asset.price)),
        trend_dot(asset.percent_change_24h),
        format_percent(asset.percent_change_24h),
    )
}

fn traditional_section(snapshot: &MarketSnapshot) -> String {
    if snapshot.gold.is_none() && snapshot.equities.is_empty() {
        return String::new();
    }

    let mut out = String::from("💼 <b>TRADITIONAL ASSETS</b>\n");
    if let Some(gold) = &snapshot.gold {
        out.push_str(&format!("🥇 <b>GOLD ({})</b>\n", escape_html(&gold.symbol)));
        out.push_str(&format!(
            "  {} | {} {}%\n",
            format_price(Some(gold.price)),
            trend_dot(gold.change_percent),
            format_percent(gold.change_percent),
        ));
    }
    for quote in &snapshot.equities {
        out.push_str(&equity_line(quote));
    }
    out
}

fn equity_line(quote: &Quote) -> String {
    format!(
        "📊 <b>{}</b> | {} | {} {}%\n",
        escape_html(&quote.symbol),
        format_price(Some(quote.price)),
        trend_dot(quote.change_percent),
        format_percent(quote.change_percent),
    )
}

fn price_delta(current: f64, previous: Option<f64>) -> Option<String> {
    let previous = previous.filter(|p| p.is_finite() && *p > 0.0)?;
    let delta = current - previous;
    if (delta / previous * 100.0).abs() <= PRICE_DELTA_THRESHOLD_PCT {
        return None;
    }

    let (arrow, verb) = if delta > 0.0 { ("↗️", "rose") } else { ("↘️", "fell") };
    Some(format!(
        "  {arrow} {verb} by {} since last check\n",
        format_price(Some(delta.abs()))
    ))
}

fn sentiment_delta(current: u8, previous: Option<u8>) -> Option<String> {
    let previous = previous?;
    let moved = current.abs_diff(previous);
    if moved <= SENTIMENT_DELTA_THRESHOLD {
        return None;
    }

    let verb = if current > previous { "rose" } else { "fell" };
    Some(format!("• Sentiment {verb} by {moved} points since last check\n"))
}
