mod dashboard_routes;
mod holdings_routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use holdings_store::{HoldingsDb, HoldingsStore};
use market_client::MarketDataClient;
use portfolio_core::PortfolioError;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HoldingsStore>,
    pub market: Arc<MarketDataClient>,
}

/// Uniform JSON envelope for every endpoint.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

pub struct AppError(PortfolioError);

impl From<PortfolioError> for AppError {
    fn from(err: PortfolioError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PortfolioError::InvalidHolding(_) => StatusCode::BAD_REQUEST,
            PortfolioError::DuplicateHolding(_) => StatusCode::CONFLICT,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            PortfolioError::ApiError(_) => StatusCode::BAD_GATEWAY,
            PortfolioError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:portfolio.db".to_string());
    let market_data_url =
        std::env::var("MARKET_DATA_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());

    let db = HoldingsDb::new(&database_url).await?;
    let state = AppState {
        store: Arc::new(HoldingsStore::new(db)),
        market: Arc::new(MarketDataClient::new(market_data_url)),
    };

    let app = Router::new()
        .route("/health", get(health))
        .merge(holdings_routes::holdings_routes())
        .merge(dashboard_routes::dashboard_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("API_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("{host}:{port}");
    tracing::info!("API server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
