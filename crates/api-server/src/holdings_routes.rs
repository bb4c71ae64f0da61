use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use holdings_store::HoldingRecord;
use portfolio_core::PortfolioError;
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct AddHoldingRequest {
    pub user_id: String,
    pub ticker: String,
    pub exchange: Option<String>,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: Option<String>,
    pub sector: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateHoldingRequest {
    pub user_id: String,
    pub ticker: String,
    pub exchange: Option<String>,
    pub shares: f64,
    pub purchase_price: f64,
    pub purchase_date: Option<String>,
    pub sector: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

pub fn holdings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/holdings", get(get_holdings))
        .route("/api/holdings", post(add_holding))
        .route("/api/holdings/:id", put(update_holding))
        .route("/api/holdings/:id", delete(delete_holding))
}

/// The caller contract the core assumes: validated here, at the edge,
/// so bad numbers never reach the engine.
fn validate_request(ticker: &str, shares: f64, purchase_price: f64) -> Result<(), AppError> {
    if ticker.trim().is_empty() {
        return Err(PortfolioError::InvalidHolding("ticker is required".to_string()).into());
    }
    if !shares.is_finite() || shares <= 0.0 {
        return Err(
            PortfolioError::InvalidHolding("shares must be a positive number".to_string()).into(),
        );
    }
    if !purchase_price.is_finite() || purchase_price < 0.0 {
        return Err(PortfolioError::InvalidHolding(
            "purchase_price must be non-negative".to_string(),
        )
        .into());
    }
    Ok(())
}

async fn get_holdings(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<Vec<HoldingRecord>>>, AppError> {
    let holdings = state.store.get_holdings(&query.user_id).await?;
    Ok(Json(ApiResponse::success(holdings)))
}

async fn add_holding(
    State(state): State<AppState>,
    Json(req): Json<AddHoldingRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    validate_request(&req.ticker, req.shares, req.purchase_price)?;

    let record = HoldingRecord {
        id: None,
        user_id: req.user_id,
        ticker: req.ticker,
        exchange: req.exchange.unwrap_or_else(|| "NSE".to_string()),
        shares: req.shares,
        purchase_price: req.purchase_price,
        purchase_date: req.purchase_date,
        sector: req.sector,
        notes: req.notes,
        created_at: None,
    };

    let id = state.store.add_holding(record).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "id": id }))))
}

async fn update_holding(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateHoldingRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    validate_request(&req.ticker, req.shares, req.purchase_price)?;

    let existing = state
        .store
        .get_holding(&req.user_id, id)
        .await?
        .ok_or_else(|| PortfolioError::NotFound(format!("holding {id}")))?;

    let record = HoldingRecord {
        id: existing.id,
        user_id: req.user_id,
        ticker: req.ticker,
        exchange: req.exchange.unwrap_or_else(|| "NSE".to_string()),
        shares: req.shares,
        purchase_price: req.purchase_price,
        purchase_date: req.purchase_date,
        sector: req.sector,
        notes: req.notes,
        created_at: existing.created_at,
    };

    state.store.update_holding(id, record).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "id": id }))))
}

async fn delete_holding(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    state.store.delete_holding(&query.user_id, id).await?;
    Ok(Json(ApiResponse::success(serde_json::json!({ "deleted": id }))))
}
