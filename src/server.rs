// 🌐 REST API over a finished report
//
// The report and enriched records are computed once at startup and shared
// read-only through Arc, so handlers never lock.

use crate::analytics::RegionStats;
use crate::enrichment::EnrichedTransaction;
use crate::report::SalesReport;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::debug;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    report: Arc<SalesReport>,
    enriched: Arc<Vec<EnrichedTransaction>>,
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/report - Full report data
async fn get_report(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.as_ref().clone()))
}

/// GET /api/summary - Overall totals and date range
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.summary.clone()))
}

/// GET /api/regions - Region performance, by sales descending
async fn get_regions(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.regions.clone()))
}

/// GET /api/regions/:region - One region's performance
async fn get_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> impl IntoResponse {
    // Decode URL-encoded region name
    let decoded_region = urlencoding::decode(&region)
        .unwrap_or_else(|_| region.clone().into())
        .into_owned();

    match state.report.regions.iter().find(|r| r.region == decoded_region) {
        Some(stats) => (StatusCode::OK, Json(ApiResponse::ok(stats.clone()))).into_response(),
        None => {
            debug!("Unknown region requested: {}", decoded_region);
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<RegionStats>::error(format!(
                    "Region not found: {}",
                    decoded_region
                ))),
            )
                .into_response()
        }
    }
}

/// GET /api/products/top - Top products by revenue
async fn get_top_products(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.top_products.clone()))
}

/// GET /api/products/low - Products under the low-performer threshold
async fn get_low_products(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.low_performers.clone()))
}

/// GET /api/customers/top - Top customers by spend
async fn get_top_customers(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.top_customers.clone()))
}

/// GET /api/daily - Daily trend, chronological
async fn get_daily(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.report.daily_trend.clone()))
}

/// GET /api/enriched - Enriched transactions, input order
async fn get_enriched(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.enriched.as_ref().clone()))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(report: Arc<SalesReport>, enriched: Arc<Vec<EnrichedTransaction>>) -> Router {
    let state = AppState { report, enriched };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/summary", get(get_summary))
        .route("/regions", get(get_regions))
        .route("/regions/:region", get(get_region))
        .route("/products/top", get(get_top_products))
        .route("/products/low", get(get_low_products))
        .route("/customers/top", get(get_top_customers))
        .route("/daily", get(get_daily))
        .route("/enriched", get(get_enriched))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
