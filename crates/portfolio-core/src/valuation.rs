use crate::models::{Holding, PriceEntry, PriceMap, ValuatedHolding};
use crate::ticker::normalize_ticker;

/// Resolve a holding's price entry: exact uppercase key first, then the
/// suffix-stripped key.
fn resolve_entry<'a>(price_map: &'a PriceMap, ticker_upper: &str) -> Option<&'a PriceEntry> {
    price_map
        .get(ticker_upper)
        .or_else(|| price_map.get(&normalize_ticker(ticker_upper)))
}

/// Join one holding with its market data. `invested` is always
/// computable; everything that depends on the market price degrades to
/// `None` when the price is unresolved. Never fails on missing data.
pub fn valuate_holding(
    holding: &Holding,
    price_map: &PriceMap,
    market_open: bool,
) -> ValuatedHolding {
    let ticker = holding.ticker.to_uppercase();
    let entry = resolve_entry(price_map, &ticker);

    let market_price = entry.and_then(|e| e.last_price);
    let invested = holding.shares * holding.purchase_price;
    let value = market_price.map(|p| holding.shares * p);
    let gain = value.map(|v| v - invested);
    let gain_pct = match gain {
        Some(g) if invested > 0.0 => Some(g / invested * 100.0),
        _ => None,
    };

    // Today's move needs yesterday's close (second-to-last daily bar)
    // and a trading day; otherwise it is unknown, not zero.
    let mut today_gain = None;
    let mut today_gain_pct = None;
    if market_open {
        if let (Some(entry), Some(price)) = (entry, market_price) {
            if entry.ohlcv.len() > 1 {
                let prev = &entry.ohlcv[entry.ohlcv.len() - 2];
                if let Some(prev_close) = prev.close.filter(|&c| c != 0.0) {
                    today_gain = Some((price - prev_close) * holding.shares);
                    today_gain_pct = Some((price - prev_close) / prev_close * 100.0);
                }
            }
        }
    }

    ValuatedHolding {
        ticker,
        exchange: holding.exchange.clone(),
        shares: holding.shares,
        purchase_price: holding.purchase_price,
        purchase_date: holding.purchase_date,
        sector: holding.sector.clone(),
        market_price,
        invested,
        value,
        gain,
        gain_pct,
        today_gain,
        today_gain_pct,
    }
}

pub fn valuate_holdings(
    holdings: &[Holding],
    price_map: &PriceMap,
    market_open: bool,
) -> Vec<ValuatedHolding> {
    holdings
        .iter()
        .map(|h| valuate_holding(h, price_map, market_open))
        .collect()
}
