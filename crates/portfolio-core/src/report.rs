use crate::correlation::correlation_matrix;
use crate::error::PortfolioError;
use crate::models::{Holding, PortfolioReport, PriceMap, ReportOptions};
use crate::performance::compute_performance;
use crate::ranking::top_performers;
use crate::summary::compute_summary;
use crate::valuation::valuate_holdings;

/// Reject holdings that break the caller contract before any math runs.
/// Missing market data is a normal condition; malformed numbers are not.
fn validate_holdings(holdings: &[Holding]) -> Result<(), PortfolioError> {
    for h in holdings {
        if h.ticker.trim().is_empty() {
            return Err(PortfolioError::InvalidHolding("empty ticker".to_string()));
        }
        if !h.shares.is_finite() || h.shares <= 0.0 {
            return Err(PortfolioError::InvalidHolding(format!(
                "{}: shares must be a positive number",
                h.ticker
            )));
        }
        if !h.purchase_price.is_finite() || h.purchase_price < 0.0 {
            return Err(PortfolioError::InvalidHolding(format!(
                "{}: purchase price must be non-negative",
                h.ticker
            )));
        }
    }
    Ok(())
}

/// One-pass portfolio analytics: valuation, totals and sector buckets,
/// benchmark-relative growth, top performers and the correlation matrix.
/// Pure and deterministic: identical inputs produce identical reports.
pub fn compute_report(
    holdings: &[Holding],
    price_map: &PriceMap,
    options: &ReportOptions,
) -> Result<PortfolioReport, PortfolioError> {
    validate_holdings(holdings)?;

    let valuated = valuate_holdings(holdings, price_map, options.market_open);
    let summary = compute_summary(&valuated, options.market_open);
    let performance = compute_performance(holdings, price_map, options.months_window);
    let top_performers = top_performers(&valuated, options.top_n);
    let correlation = correlation_matrix(&performance);

    Ok(PortfolioReport {
        holdings: valuated,
        summary,
        performance,
        top_performers,
        correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthlyBar, PriceEntry};

    fn holding(ticker: &str, shares: f64, price: f64, sector: Option<&str>) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            exchange: "NSE".to_string(),
            shares,
            purchase_price: price,
            purchase_date: None,
            sector: sector.map(|s| s.to_string()),
            notes: None,
        }
    }

    fn options_closed() -> ReportOptions {
        ReportOptions {
            months_window: 6,
            top_n: 5,
            market_open: false,
        }
    }

    fn price_entry(last: f64) -> PriceEntry {
        PriceEntry {
            last_price: Some(last),
            ..Default::default()
        }
    }

    fn month_bar(month: &str, open: f64, close: f64) -> MonthlyBar {
        MonthlyBar {
            month: Some(month.to_string()),
            open: Some(open),
            close: Some(close),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let holdings = vec![
            holding("TCS", 10.0, 3000.0, Some("IT")),
            holding("HDFCBANK", 5.0, 1500.0, Some("Banking")),
        ];
        let mut map = PriceMap::new();
        map.insert("TCS".to_string(), price_entry(3300.0));
        map.insert("HDFCBANK".to_string(), price_entry(1600.0));

        let report = compute_report(&holdings, &map, &options_closed()).unwrap();

        assert_eq!(report.summary.total_invested, 37500.0);
        assert_eq!(report.summary.current_value, Some(41000.0));
        assert_eq!(report.summary.total_gain, Some(3500.0));
        assert!((report.summary.total_gain_pct.unwrap() - 9.333333333333334).abs() < 1e-9);

        let it = report.summary.sectors.iter().find(|s| s.sector == "IT").unwrap();
        let banking = report
            .summary
            .sectors
            .iter()
            .find(|s| s.sector == "Banking")
            .unwrap();
        assert_eq!(it.invested, 30000.0);
        assert_eq!(it.value, 33000.0);
        assert!((it.pct.unwrap() - 80.48780487804879).abs() < 1e-9);
        assert_eq!(banking.invested, 7500.0);
        assert_eq!(banking.value, 8000.0);
        assert!((banking.pct.unwrap() - 19.51219512195122).abs() < 1e-9);

        // No monthly data anywhere -> empty performance, empty matrix.
        assert!(report.performance.is_empty());
        assert!(report.correlation.assets.is_empty());

        assert_eq!(report.top_performers.len(), 2);
        assert_eq!(report.top_performers[0].ticker, "TCS");
    }

    #[test]
    fn test_report_is_deterministic() {
        let holdings = vec![
            holding("TCS", 10.0, 3000.0, Some("IT")),
            holding("HDFCBANK", 5.0, 1500.0, Some("Banking")),
        ];
        let mut map = PriceMap::new();
        map.insert("TCS".to_string(), price_entry(3300.0));
        map.insert("HDFCBANK".to_string(), price_entry(1600.0));
        map.insert(
            "^NSEI".to_string(),
            PriceEntry {
                monthly_ohlc: vec![
                    month_bar("2025-09-30", 100.0, 104.0),
                    month_bar("2025-10-31", 104.0, 108.0),
                ],
                ..Default::default()
            },
        );

        let opts = options_closed();
        let a = compute_report(&holdings, &map, &opts).unwrap();
        let b = compute_report(&holdings, &map, &opts).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_fail_closed_total_with_unresolved_price() {
        let holdings = vec![
            holding("TCS", 10.0, 3000.0, Some("IT")),
            holding("UNLISTED", 5.0, 100.0, None),
        ];
        let mut map = PriceMap::new();
        map.insert("TCS".to_string(), price_entry(3300.0));

        let report = compute_report(&holdings, &map, &options_closed()).unwrap();
        assert!(report.summary.current_value.is_none());
        // Invested is still fully known.
        assert_eq!(report.summary.total_invested, 30500.0);
    }

    #[test]
    fn test_rejects_non_positive_shares() {
        let bad = vec![holding("TCS", 0.0, 3000.0, None)];
        let err = compute_report(&bad, &PriceMap::new(), &options_closed()).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidHolding(_)));
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        let bad = vec![holding("TCS", f64::NAN, 3000.0, None)];
        assert!(compute_report(&bad, &PriceMap::new(), &options_closed()).is_err());

        let bad = vec![holding("TCS", 1.0, f64::INFINITY, None)];
        assert!(compute_report(&bad, &PriceMap::new(), &options_closed()).is_err());
    }

    #[test]
    fn test_rejects_empty_ticker() {
        let bad = vec![holding("  ", 1.0, 100.0, None)];
        let err = compute_report(&bad, &PriceMap::new(), &options_closed()).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidHolding(_)));
    }

    #[test]
    fn test_partial_price_map_still_completes() {
        // A provider failure upstream hands the core a sparse map; the
        // report must still compute everything that is knowable.
        let holdings = vec![
            holding("TCS", 10.0, 3000.0, Some("IT")),
            holding("INFY", 2.0, 1400.0, Some("IT")),
        ];
        let mut map = PriceMap::new();
        map.insert("TCS".to_string(), price_entry(3300.0));

        let report = compute_report(&holdings, &map, &options_closed()).unwrap();
        assert_eq!(report.holdings.len(), 2);
        assert_eq!(report.holdings[0].value, Some(33000.0));
        assert!(report.holdings[1].value.is_none());
        assert_eq!(report.top_performers.len(), 1);
    }
}
