use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use holdings_store::HoldingRecord;
use market_client::with_benchmarks;
use portfolio_core::{
    compute_report, CorrelationMatrix, GrowthSeries, Holding, PortfolioReport, PriceMap,
    ReportOptions,
};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub user_id: String,
}

/// Wire shape consumed by the dashboard frontend.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub summary: SummaryDto,
    pub holdings: Vec<HoldingDto>,
    pub performance: Vec<GrowthSeries>,
    pub sector_allocation: Vec<SectorAllocationDto>,
    pub top_performers: Vec<TopPerformerDto>,
    pub correlation: CorrelationMatrix,
    pub risk_metrics: RiskMetricsDto,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDto {
    pub total_value: Option<f64>,
    pub total_invested: f64,
    pub total_gain_loss: Option<f64>,
    pub total_gain_loss_percent: Option<f64>,
    pub today_gain_loss: f64,
    pub today_gain_loss_percent: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDto {
    pub id: Option<i64>,
    pub ticker: String,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: Option<NaiveDate>,
    pub sector: Option<String>,
    pub exchange: String,
    pub market_price: Option<f64>,
    pub invested: f64,
    pub value: Option<f64>,
    pub gain: Option<f64>,
    pub gain_pct: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorAllocationDto {
    pub name: String,
    pub value: Option<f64>,
    pub amount: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformerDto {
    pub symbol: String,
    pub exchange: String,
    pub name: String,
    pub gain: Option<f64>,
    pub value: Option<f64>,
}

/// Placeholder block the frontend renders as "coming soon"; none of
/// these are computed server-side yet.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetricsDto {
    pub sharpe_ratio: Option<f64>,
    pub volatility: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub beta: Option<f64>,
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardDto>>, AppError> {
    let records = state.store.get_holdings(&query.user_id).await?;
    let holdings: Vec<Holding> = records.iter().map(|r| r.to_holding()).collect();

    // A provider failure is a degraded report, not a failed request:
    // the engine treats every missing ticker as an unknown price.
    let price_map = if holdings.is_empty() {
        PriceMap::new()
    } else {
        let tickers: Vec<String> = holdings.iter().map(|h| h.ticker.clone()).collect();
        match state.market.fetch_price_map(&with_benchmarks(&tickers)).await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!("price map fetch failed, computing with empty map: {err}");
                PriceMap::new()
            }
        }
    };

    let report = compute_report(&holdings, &price_map, &ReportOptions::for_today())?;
    Ok(Json(ApiResponse::success(to_dto(&records, report))))
}

fn to_dto(records: &[HoldingRecord], report: PortfolioReport) -> DashboardDto {
    let PortfolioReport {
        holdings,
        summary,
        performance,
        top_performers,
        correlation,
    } = report;

    let holdings = records
        .iter()
        .zip(holdings)
        .map(|(record, v)| HoldingDto {
            id: record.id,
            ticker: v.ticker,
            shares: v.shares,
            purchase_price: v.purchase_price,
            purchase_date: v.purchase_date,
            sector: v.sector,
            exchange: v.exchange,
            market_price: v.market_price,
            invested: v.invested,
            value: v.value,
            gain: v.gain,
            gain_pct: v.gain_pct,
        })
        .collect();

    let sector_allocation = summary
        .sectors
        .iter()
        .map(|s| SectorAllocationDto {
            name: s.sector.clone(),
            value: s.pct,
            amount: s.value,
        })
        .collect();

    let top_performers = top_performers
        .into_iter()
        .map(|h| TopPerformerDto {
            symbol: h.ticker.clone(),
            exchange: h.exchange,
            name: h.ticker,
            gain: h.gain_pct,
            value: h.value,
        })
        .collect();

    DashboardDto {
        summary: SummaryDto {
            total_value: summary.current_value,
            total_invested: summary.total_invested,
            total_gain_loss: summary.total_gain,
            total_gain_loss_percent: summary.total_gain_pct,
            today_gain_loss: summary.today_gain,
            today_gain_loss_percent: summary.today_gain_pct,
        },
        holdings,
        performance,
        sector_allocation,
        top_performers,
        correlation,
        risk_metrics: RiskMetricsDto {
            sharpe_ratio: None,
            volatility: None,
            max_drawdown: None,
            beta: None,
        },
    }
}
