use crate::models::{PortfolioSummary, SectorAllocation, ValuatedHolding};

/// Reduce valuated holdings into portfolio totals and sector buckets.
///
/// `current_value` fails closed: one unresolved price makes the whole
/// total unknown. Sector sums fail open so allocation charts can still
/// render on partial data.
pub fn compute_summary(holdings: &[ValuatedHolding], market_open: bool) -> PortfolioSummary {
    let total_invested: f64 = holdings.iter().map(|h| h.invested).sum();

    let missing_prices = holdings.iter().any(|h| h.value.is_none());
    let current_value = if missing_prices {
        None
    } else {
        Some(holdings.iter().filter_map(|h| h.value).sum())
    };
    let total_gain = current_value.map(|cv| cv - total_invested);
    let total_gain_pct = match total_gain {
        Some(g) if total_invested > 0.0 => Some(g / total_invested * 100.0),
        _ => None,
    };

    // Buckets keep first-seen order so output is stable across runs.
    let mut sectors: Vec<SectorAllocation> = Vec::new();
    for h in holdings {
        let name = h.sector.clone().unwrap_or_else(|| "Unknown".to_string());
        let idx = match sectors.iter().position(|s| s.sector == name) {
            Some(i) => i,
            None => {
                sectors.push(SectorAllocation {
                    sector: name,
                    invested: 0.0,
                    value: 0.0,
                    pct: None,
                });
                sectors.len() - 1
            }
        };
        sectors[idx].invested += h.invested;
        sectors[idx].value += h.value.unwrap_or(0.0);
    }
    for s in &mut sectors {
        s.pct = match current_value {
            Some(cv) if cv > 0.0 => Some(s.value / cv * 100.0),
            _ => None,
        };
    }

    let mut today_gain = 0.0;
    let mut today_gain_pct = 0.0;
    if market_open {
        let contributing: Vec<&ValuatedHolding> =
            holdings.iter().filter(|h| h.today_gain.is_some()).collect();
        today_gain = contributing.iter().filter_map(|h| h.today_gain).sum();

        // Yesterday's portfolio value, reconstructed by inverting each
        // holding's intraday percentage rather than re-reading the daily
        // series. Holdings without a percentage are skipped.
        let prev_value: f64 = contributing
            .iter()
            .filter_map(|h| match (h.market_price, h.today_gain_pct) {
                (Some(price), Some(pct)) => Some(price / (1.0 + pct / 100.0) * h.shares),
                _ => None,
            })
            .sum();

        if prev_value > 0.0 {
            today_gain_pct = today_gain / prev_value * 100.0;
        }
    }

    PortfolioSummary {
        total_invested,
        current_value,
        total_gain,
        total_gain_pct,
        today_gain,
        today_gain_pct,
        sectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valuated(
        ticker: &str,
        sector: Option<&str>,
        invested: f64,
        value: Option<f64>,
    ) -> ValuatedHolding {
        let gain = value.map(|v| v - invested);
        ValuatedHolding {
            ticker: ticker.to_string(),
            exchange: "NSE".to_string(),
            shares: 1.0,
            purchase_price: invested,
            purchase_date: None,
            sector: sector.map(|s| s.to_string()),
            market_price: value,
            invested,
            value,
            gain,
            gain_pct: gain.filter(|_| invested > 0.0).map(|g| g / invested * 100.0),
            today_gain: None,
            today_gain_pct: None,
        }
    }

    #[test]
    fn test_totals() {
        let holdings = vec![
            valuated("TCS", Some("IT"), 30000.0, Some(33000.0)),
            valuated("HDFCBANK", Some("Banking"), 7500.0, Some(8000.0)),
        ];
        let summary = compute_summary(&holdings, false);

        assert_eq!(summary.total_invested, 37500.0);
        assert_eq!(summary.current_value, Some(41000.0));
        assert_eq!(summary.total_gain, Some(3500.0));
        let pct = summary.total_gain_pct.unwrap();
        assert!((pct - 9.333333333333334).abs() < 1e-9);
    }

    #[test]
    fn test_current_value_fails_closed() {
        let holdings = vec![
            valuated("TCS", Some("IT"), 30000.0, Some(33000.0)),
            valuated("UNLISTED", None, 1000.0, None),
        ];
        let summary = compute_summary(&holdings, false);

        assert_eq!(summary.total_invested, 31000.0);
        assert!(summary.current_value.is_none());
        assert!(summary.total_gain.is_none());
        assert!(summary.total_gain_pct.is_none());
    }

    #[test]
    fn test_sector_buckets_sum_to_total_invested() {
        let holdings = vec![
            valuated("TCS", Some("IT"), 30000.0, Some(33000.0)),
            valuated("INFY", Some("IT"), 10000.0, Some(11000.0)),
            valuated("HDFCBANK", Some("Banking"), 7500.0, Some(8000.0)),
            valuated("MYSTERY", None, 500.0, Some(450.0)),
        ];
        let summary = compute_summary(&holdings, false);

        let bucketed: f64 = summary.sectors.iter().map(|s| s.invested).sum();
        assert_eq!(bucketed, summary.total_invested);
        assert!(summary.sectors.iter().any(|s| s.sector == "Unknown"));
    }

    #[test]
    fn test_sector_percentages() {
        let holdings = vec![
            valuated("TCS", Some("IT"), 30000.0, Some(33000.0)),
            valuated("HDFCBANK", Some("Banking"), 7500.0, Some(8000.0)),
        ];
        let summary = compute_summary(&holdings, false);

        let it = summary.sectors.iter().find(|s| s.sector == "IT").unwrap();
        let banking = summary.sectors.iter().find(|s| s.sector == "Banking").unwrap();
        assert!((it.pct.unwrap() - 33000.0 / 41000.0 * 100.0).abs() < 1e-9);
        assert!((banking.pct.unwrap() - 8000.0 / 41000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sector_partials_survive_unknown_total() {
        let holdings = vec![
            valuated("TCS", Some("IT"), 30000.0, Some(33000.0)),
            valuated("UNLISTED", Some("IT"), 1000.0, None),
        ];
        let summary = compute_summary(&holdings, false);

        let it = summary.sectors.iter().find(|s| s.sector == "IT").unwrap();
        // Value is a best-effort partial sum, percentage is unknowable.
        assert_eq!(it.invested, 31000.0);
        assert_eq!(it.value, 33000.0);
        assert!(it.pct.is_none());
    }

    #[test]
    fn test_today_aggregate_on_open_market() {
        let mut a = valuated("TCS", Some("IT"), 1000.0, Some(1100.0));
        a.shares = 10.0;
        a.market_price = Some(110.0);
        a.today_gain = Some(100.0); // +10 per share over prev close 100
        a.today_gain_pct = Some(10.0);

        let mut b = valuated("INFY", Some("IT"), 2000.0, Some(2000.0));
        b.shares = 10.0;
        b.market_price = Some(200.0);
        b.today_gain = None; // no intraday data; silently skipped
        b.today_gain_pct = None;

        let summary = compute_summary(&[a, b], true);
        assert_eq!(summary.today_gain, 100.0);
        // Previous value reconstructed only from the contributing holding:
        // 110 / 1.10 * 10 = 1000, so 100 / 1000 = 10%.
        assert!((summary.today_gain_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_today_aggregate_zeroed_when_closed() {
        let mut a = valuated("TCS", Some("IT"), 1000.0, Some(1100.0));
        a.today_gain = Some(100.0);
        a.today_gain_pct = Some(10.0);

        let summary = compute_summary(&[a], false);
        assert_eq!(summary.today_gain, 0.0);
        assert_eq!(summary.today_gain_pct, 0.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = compute_summary(&[], true);
        assert_eq!(summary.total_invested, 0.0);
        assert_eq!(summary.current_value, Some(0.0));
        assert!(summary.total_gain_pct.is_none());
        assert!(summary.sectors.is_empty());
    }
}
