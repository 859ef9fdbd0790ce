//! Aggregation handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::middleware::CurrentUser;
use crate::services::report::{MonthlyQuery, ReportQuery};
use crate::services::ReportService;
use crate::AppState;

/// GET /api/sales/stats
pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Response {
    let service = ReportService::new(state.db.clone());

    match service.stats(&user, query).await {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/daily
pub async fn daily(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Response {
    let service = ReportService::new(state.db.clone());

    match service.daily(&user, query).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/monthly
pub async fn monthly(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MonthlyQuery>,
) -> Response {
    let service = ReportService::new(state.db.clone());

    match service.monthly(&user, query).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/by-product
pub async fn by_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Response {
    let service = ReportService::new(state.db.clone());

    match service.by_product(&user, query).await {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/by-salesperson (admin)
pub async fn by_salesperson(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> Response {
    let service = ReportService::new(state.db.clone());

    match service.by_salesperson(&user, query).await {
        Ok(breakdown) => (StatusCode::OK, Json(breakdown)).into_response(),
        Err(e) => e.into_response(),
    }
}
