//! Product catalog handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::product::{
    BulkUpdateInput, CreateProductInput, ProductListQuery, ProductSearchQuery, UpdateProductInput,
};
use crate::services::ProductService;
use crate::AppState;

/// POST /api/products (admin)
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = ProductService::new(state.db.clone());

    match service.create_product(input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.list_products(query).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products/search
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.search_products(query).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products/categories
pub async fn list_categories(State(state): State<AppState>) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.categories().await {
        Ok(values) => (StatusCode::OK, Json(values)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products/departments
pub async fn list_departments(State(state): State<AppState>) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.departments().await {
        Ok(values) => (StatusCode::OK, Json(values)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct SubcategoryQuery {
    pub category: Option<String>,
}

/// GET /api/products/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    Query(query): Query<SubcategoryQuery>,
) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.subcategories(query.category).await {
        Ok(values) => (StatusCode::OK, Json(values)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products/code/:item_code
pub async fn get_by_item_code(
    State(state): State<AppState>,
    Path(item_code): Path<String>,
) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.get_by_item_code(&item_code).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/products/:id
pub async fn get_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let service = ProductService::new(state.db.clone());

    match service.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/products/:id (admin)
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = ProductService::new(state.db.clone());

    match service.update_product(id, input).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/products/:id (admin, soft delete)
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = ProductService::new(state.db.clone());

    match service.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/products/bulk-update (admin)
pub async fn bulk_update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<BulkUpdateInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = ProductService::new(state.db.clone());

    match service.bulk_update(input).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => e.into_response(),
    }
}
