use crate::market_data::types::{CryptoAsset, is_stablecoin};

/// Best 24h performers, highest change first. Stablecoins and `exclude`
/// never appear; a missing change ranks as 0.
pub fn top_gainers<'a>(assets: &'a [CryptoAsset], exclude: &[&str], n: usize) -> Vec<&'a CryptoAsset> {
    let mut ranked = candidates(assets, exclude);
    ranked.sort_by(|a, b| change(b).total_cmp(&change(a)));
    ranked.truncate(n);
    ranked
}

/// Worst 24h performers, lowest change first.
pub fn top_losers<'a>(assets: &'a [CryptoAsset], exclude: &[&str], n: usize) -> Vec<&'a CryptoAsset> {
    let mut ranked = candidates(assets, exclude);
    ranked.sort_by(|a, b| change(a).total_cmp(&change(b)));
    ranked.truncate(n);
    ranked
}

fn candidates<'a>(assets: &'a [CryptoAsset], exclude: &[&str]) -> Vec<&'a CryptoAsset> {
    assets
        .iter()
        .filter(|a| !is_stablecoin(&a.symbol) && !exclude.contains(&a.symbol.as_str()))
        .collect()
}

fn change(asset: &CryptoAsset) -> f64 {
    asset.percent_change_24h.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(symbol: &str, change: Option<f64>) -> CryptoAsset {
        CryptoAsset {
            symbol: symbol.to_string(),
            price: 1.0,
            percent_change_24h: change,
        }
    }

    fn changes(ranked: &[&CryptoAsset]) -> Vec<f64> {
        ranked.iter().map(|a| change(a)).collect()
    }

    fn sample() -> Vec<CryptoAsset> {
        [12.0, -3.0, 7.0, -9.0, 0.0]
            .iter()
            .enumerate()
            .map(|(i, c)| asset(&format!("A{i}"), Some(*c)))
            .collect()
    }

    #[test]
    fn gainers_are_sorted_descending_and_truncated() {
        let assets = sample();
        assert_eq!(changes(&top_gainers(&assets, &[], 3)), vec![12.0, 7.0, 0.0]);
    }

    #[test]
    fn losers_are_sorted_ascending_and_truncated() {
        let assets = sample();
        assert_eq!(changes(&top_losers(&assets, &[], 3)), vec![-9.0, -3.0, 0.0]);
    }

    #[test]
    fn stablecoins_are_never_ranked() {
        let mut assets = sample();
        assets.push(asset("USDT", Some(50.0)));
        assets.push(asset("USDC", Some(-50.0)));

        let gainers = top_gainers(&assets, &[], 10);
        let losers = top_losers(&assets, &[], 10);
        assert!(gainers.iter().chain(losers.iter()).all(|a| a.symbol != "USDT" && a.symbol != "USDC"));
    }

    #[test]
    fn explicit_exclusions_are_honoured() {
        let assets = vec![asset("BTC", Some(20.0)), asset("SOL", Some(3.0))];
        let gainers = top_gainers(&assets, &["BTC"], 5);
        assert_eq!(gainers.len(), 1);
        assert_eq!(gainers[0].symbol, "SOL");
    }

    #[test]
    fn missing_change_ranks_as_zero() {
        let assets = vec![asset("UP", Some(1.0)), asset("NONE", None), asset("DOWN", Some(-1.0))];
        let gainers: Vec<&str> = top_gainers(&assets, &[], 3).iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(gainers, vec!["UP", "NONE", "DOWN"]);
    }
}
