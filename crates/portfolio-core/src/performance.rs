use crate::models::{GrowthPoint, GrowthSeries, Holding, MonthlyBar, PriceMap};
use crate::ticker::normalize_ticker;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const NIFTY_TICKER: &str = "^NSEI";
pub const SENSEX_TICKER: &str = "^BSESN";
pub const DEFAULT_MONTHS_WINDOW: usize = 6;

pub const PORTFOLIO_SERIES: &str = "Portfolio";
pub const NIFTY_SERIES: &str = "Nifty";
pub const SENSEX_SERIES: &str = "Sensex";

/// Open/close for one instrument-month, keyed by normalized ticker and
/// then by "YYYY-MM".
struct MonthBar {
    open: Option<f64>,
    close: Option<f64>,
}

type MonthlyLookup = HashMap<String, HashMap<String, MonthBar>>;

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// "YYYY-MM" identity of a monthly bar: the head of the explicit month
/// field when present, else the parsed date field. Unparseable bars have
/// no identity and are dropped from the axis.
fn month_key(bar: &MonthlyBar) -> Option<String> {
    if let Some(month) = bar.month.as_deref() {
        if let Some(head) = month.get(..7) {
            return Some(head.to_string());
        }
    }
    let date = bar.date.as_deref()?;
    let head = date.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m").to_string())
}

/// The shared month axis: trailing `window` months of the reference
/// instrument. Nifty is the reference when its key is present (under any
/// suffix variant); otherwise the first entry carrying monthly data.
/// An empty result means performance cannot be computed, not an error.
pub fn pick_months(price_map: &PriceMap, window: usize) -> Vec<String> {
    let reference = price_map
        .get(NIFTY_TICKER)
        .or_else(|| price_map.get("^NSEI.NS"))
        .or_else(|| price_map.get("NSEI"))
        .or_else(|| price_map.values().find(|e| !e.monthly_ohlc.is_empty()));

    let Some(source) = reference else {
        return Vec::new();
    };
    let bars = &source.monthly_ohlc;
    let start = bars.len().saturating_sub(window);
    bars[start..].iter().filter_map(month_key).collect()
}

fn build_monthly_lookup(price_map: &PriceMap) -> MonthlyLookup {
    let mut lookup = MonthlyLookup::new();
    for (raw_key, entry) in price_map {
        let mut months: HashMap<String, MonthBar> = HashMap::new();
        for bar in &entry.monthly_ohlc {
            let Some(key) = month_key(bar) else { continue };
            months.insert(
                key,
                MonthBar {
                    open: bar.open,
                    close: bar.close,
                },
            );
        }
        lookup.insert(normalize_ticker(raw_key), months);
    }
    lookup
}

fn all_null(name: &str, months: &[String]) -> GrowthSeries {
    GrowthSeries {
        name: name.to_string(),
        series: months
            .iter()
            .map(|m| GrowthPoint {
                month: m.clone(),
                growth_pct: None,
            })
            .collect(),
    }
}

/// Growth index for one instrument: each month's close over the first
/// axis month's open, as a percentage. The anchor never moves, so a
/// missing intermediate month nulls that month only. A missing (or zero)
/// anchor nulls the whole series.
fn instrument_series(
    name: &str,
    ticker: &str,
    months: &[String],
    lookup: &MonthlyLookup,
) -> GrowthSeries {
    let Some(instrument) = lookup.get(&normalize_ticker(ticker)) else {
        return all_null(name, months);
    };
    let anchor = months
        .first()
        .and_then(|m| instrument.get(m))
        .and_then(|bar| bar.open)
        .filter(|&open| open != 0.0);
    let Some(anchor) = anchor else {
        return all_null(name, months);
    };

    let series = months
        .iter()
        .map(|m| GrowthPoint {
            month: m.clone(),
            growth_pct: instrument
                .get(m)
                .and_then(|bar| bar.close)
                .map(|close| round2(close / anchor * 100.0)),
        })
        .collect();

    GrowthSeries {
        name: name.to_string(),
        series,
    }
}

/// Growth index for the whole portfolio. The anchor is the summed
/// opening value of every holding in the first axis month; if any
/// holding's open is missing there, or the sum is zero, the series is
/// unknowable and every month is null. Within a month, one missing close
/// nulls that month's point; holdings are never silently dropped.
fn portfolio_series(
    holdings: &[Holding],
    months: &[String],
    lookup: &MonthlyLookup,
) -> GrowthSeries {
    let defs: Vec<(String, f64)> = holdings
        .iter()
        .map(|h| (normalize_ticker(&h.ticker), h.shares))
        .collect();

    let first_month = match months.first() {
        Some(m) => m,
        None => return all_null(PORTFOLIO_SERIES, months),
    };

    let mut anchor = 0.0;
    for (key, shares) in &defs {
        match lookup
            .get(key)
            .and_then(|lk| lk.get(first_month))
            .and_then(|bar| bar.open)
        {
            Some(open) => anchor += shares * open,
            None => return all_null(PORTFOLIO_SERIES, months),
        }
    }
    if anchor == 0.0 {
        return all_null(PORTFOLIO_SERIES, months);
    }

    let series = months
        .iter()
        .map(|m| {
            let mut month_value = 0.0;
            let mut missing = false;
            for (key, shares) in &defs {
                match lookup
                    .get(key)
                    .and_then(|lk| lk.get(m))
                    .and_then(|bar| bar.close)
                {
                    Some(close) => month_value += shares * close,
                    None => {
                        missing = true;
                        break;
                    }
                }
            }
            GrowthPoint {
                month: m.clone(),
                growth_pct: if missing {
                    None
                } else {
                    Some(round2(month_value / anchor * 100.0))
                },
            }
        })
        .collect();

    GrowthSeries {
        name: PORTFOLIO_SERIES.to_string(),
        series,
    }
}

/// Portfolio, Nifty and Sensex growth series over a common month axis.
/// Returns an empty list when no reference months exist.
pub fn compute_performance(
    holdings: &[Holding],
    price_map: &PriceMap,
    window: usize,
) -> Vec<GrowthSeries> {
    let months = pick_months(price_map, window);
    if months.is_empty() {
        return Vec::new();
    }
    let lookup = build_monthly_lookup(price_map);

    vec![
        portfolio_series(holdings, &months, &lookup),
        instrument_series(NIFTY_SERIES, NIFTY_TICKER, &months, &lookup),
        instrument_series(SENSEX_SERIES, SENSEX_TICKER, &months, &lookup),
    ]
}
