//! Number and pictogram formatting for digest lines. Every function accepts
//! missing or non-finite input and returns a placeholder instead of failing.

pub const PLACEHOLDER: &str = "N/A";

const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Dollar magnitude with the largest fitting T/B/M suffix, e.g. `$1.50B`.
pub fn format_usd_compact(value: Option<f64>) -> String {
    let Some(v) = finite(value) else {
        return PLACEHOLDER.to_string();
    };

    if v >= TRILLION {
        format!("${:.2}T", v / TRILLION)
    } else if v >= BILLION {
        format!("${:.2}B", v / BILLION)
    } else if v >= MILLION {
        format!("${:.2}M", v / MILLION)
    } else {
        usd(v, 2)
    }
}

/// Unit price. Sub-dollar prices get 6 decimals, sub-cent prices 8.
pub fn format_price(value: Option<f64>) -> String {
    let Some(v) = finite(value) else {
        return PLACEHOLDER.to_string();
    };

    if v < 0.01 {
        format!("${v:.8}")
    } else if v < 1.0 {
        format!("${v:.6}")
    } else {
        usd(v, 2)
    }
}

/// Signed percentage without the `%` sign. Missing input reads as no change.
pub fn format_percent(value: Option<f64>) -> String {
    format!("{:+.2}", finite(value).unwrap_or(0.0))
}

pub fn format_dominance(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{v:.1}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Pictogram for a 24h change. Boundaries belong to the bucket above.
pub fn change_emoji(change: Option<f64>) -> &'static str {
    let Some(c) = finite(change) else {
        return "❓";
    };

    if c > 10.0 {
        "🚀"
    } else if c > 5.0 {
        "🔥"
    } else if c > 0.0 {
        "📈"
    } else if c > -5.0 {
        "📉"
    } else if c > -10.0 {
        "💀"
    } else {
        "🪦"
    }
}

pub fn sentiment_emoji(score: u8) -> &'static str {
    match score {
        s if s < 25 => "😱",
        s if s < 45 => "😰",
        s if s < 55 => "😐",
        s if s < 75 => "😊",
        _ => "🤑",
    }
}

pub fn trend_dot(change: Option<f64>) -> &'static str {
    if finite(change).unwrap_or(0.0) > 0.0 {
        "🟢"
    } else {
        "🔴"
    }
}

/// Escapes the characters Telegram's HTML mode treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn usd(value: f64, decimals: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${}", with_thousands(value.abs(), decimals))
}

/// `1234567.891` → `1,234,567.89`
fn with_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
