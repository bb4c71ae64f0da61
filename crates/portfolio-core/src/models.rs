use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::is_market_open_today;

fn default_exchange() -> String {
    "NSE".to_string()
}

/// One owned position, as handed to the engine by the holdings store.
/// The store guarantees `(ticker, exchange)` uniqueness per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    pub shares: f64,
    pub purchase_price: f64,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One daily bar in the provider's pandas-records wire casing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
}

/// One calendar-month bar. `month` carries a first-of-month identity as a
/// date string ("2025-10-31" style); `date` is a fallback some feeds use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyBar {
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Volume")]
    pub volume: Option<f64>,
}

/// Market data for one instrument, exactly as the quote service sends it.
/// A missing `last_price` means the price is unknown, never zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceEntry {
    #[serde(default)]
    pub raw_ticker: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub ohlcv: Vec<DailyBar>,
    #[serde(default)]
    pub monthly_ohlc: Vec<MonthlyBar>,
}

/// Price map keyed by ticker. The same instrument may appear under
/// several suffix variants; a ticker may be absent entirely. Ordered so
/// that iteration (and the reference-instrument fallback) is
/// deterministic.
pub type PriceMap = BTreeMap<String, PriceEntry>;

/// A holding joined with its market data. Every derived field that
/// depends on an unresolved price is `None`, never a defaulted zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuatedHolding {
    pub ticker: String,
    pub exchange: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: Option<NaiveDate>,
    pub sector: Option<String>,
    pub market_price: Option<f64>,
    pub invested: f64,
    pub value: Option<f64>,
    pub gain: Option<f64>,
    pub gain_pct: Option<f64>,
    pub today_gain: Option<f64>,
    pub today_gain_pct: Option<f64>,
}

/// Per-sector bucket. `invested` and `value` are best-effort partial
/// sums; `pct` is only present when the portfolio total is fully known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorAllocation {
    pub sector: String,
    pub invested: f64,
    pub value: f64,
    pub pct: Option<f64>,
}

/// Portfolio totals. `current_value` is all-or-nothing: `None` as soon
/// as any holding's price is unresolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub current_value: Option<f64>,
    pub total_gain: Option<f64>,
    pub total_gain_pct: Option<f64>,
    pub today_gain: f64,
    pub today_gain_pct: f64,
    pub sectors: Vec<SectorAllocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub month: String,
    pub growth_pct: Option<f64>,
}

/// A named growth-index series over the shared month axis
/// (100 = unchanged from the anchor).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSeries {
    pub name: String,
    pub series: Vec<GrowthPoint>,
}

/// Symmetric Pearson matrix over the growth series. `None` marks pairs
/// with too little overlapping data to correlate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub assets: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Report knobs. `market_open` is passed in rather than read from the
/// clock so the whole computation stays a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub months_window: usize,
    pub top_n: usize,
    pub market_open: bool,
}

impl ReportOptions {
    pub fn for_today() -> Self {
        Self {
            months_window: crate::performance::DEFAULT_MONTHS_WINDOW,
            top_n: crate::ranking::TOP_PERFORMERS_COUNT,
            market_open: is_market_open_today(),
        }
    }
}

/// Everything the dashboard needs, computed in one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    pub holdings: Vec<ValuatedHolding>,
    pub summary: PortfolioSummary,
    pub performance: Vec<GrowthSeries>,
    pub top_performers: Vec<ValuatedHolding>,
    pub correlation: CorrelationMatrix,
}
