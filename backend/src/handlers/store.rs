//! Store management handlers, admin only

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::store::{CreateStoreInput, UpdateStoreInput};
use crate::services::StoreService;
use crate::AppState;

/// POST /api/stores
pub async fn create_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateStoreInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = StoreService::new(state.db.clone());

    match service.create_store(input).await {
        Ok(store) => (StatusCode::CREATED, Json(store)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/stores
pub async fn list_stores(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = StoreService::new(state.db.clone());

    match service.list_stores().await {
        Ok(stores) => (StatusCode::OK, Json(stores)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/stores/:id
pub async fn get_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = StoreService::new(state.db.clone());

    match service.get_store(id).await {
        Ok(store) => (StatusCode::OK, Json(store)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/stores/:id
pub async fn update_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStoreInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = StoreService::new(state.db.clone());

    match service.update_store(id, input).await {
        Ok(store) => (StatusCode::OK, Json(store)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/stores/:id (deactivate)
pub async fn delete_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = StoreService::new(state.db.clone());

    match service.delete_store(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
