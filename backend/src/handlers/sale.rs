//! Sale ledger handlers
//!
//! Creation accepts either a plain JSON body or, when a receipt photo is
//! attached, a multipart form with a `sale` JSON part and a `receipt_photo`
//! file part.

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::sale::{
    CancelSaleInput, CreateSaleInput, ReceiptUpload, RefundSaleInput, SaleListQuery,
    UpdateStatusInput,
};
use crate::services::SaleService;
use crate::AppState;

/// Upper bound for JSON sale bodies and receipt photos.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// POST /api/sales
pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    request: Request,
) -> Response {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (input, receipt) = if content_type.starts_with("multipart/form-data") {
        match parse_multipart_sale(request).await {
            Ok(parsed) => parsed,
            Err(e) => return e.into_response(),
        }
    } else {
        match parse_json_sale(request).await {
            Ok(input) => (input, None),
            Err(e) => return e.into_response(),
        }
    };

    let service = SaleService::new(state.db.clone());

    match service.create_sale(&user, input, receipt).await {
        Ok(sale) => (StatusCode::CREATED, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn parse_json_sale(request: Request) -> Result<CreateSaleInput, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::ValidationError(format!("Failed to read request body: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::ValidationError(format!("Invalid sale document: {}", e)))
}

async fn parse_multipart_sale(
    request: Request,
) -> Result<(CreateSaleInput, Option<ReceiptUpload>), AppError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart request: {}", e)))?;

    let mut input: Option<CreateSaleInput> = None;
    let mut receipt: Option<ReceiptUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Invalid multipart field: {}", e)))?
    {
        match field.name() {
            Some("sale") => {
                let text = field.text().await.map_err(|e| {
                    AppError::ValidationError(format!("Invalid sale part: {}", e))
                })?;
                input = Some(serde_json::from_str(&text).map_err(|e| {
                    AppError::ValidationError(format!("Invalid sale document: {}", e))
                })?);
            }
            Some("receipt_photo") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::ValidationError(format!("Invalid receipt upload: {}", e))
                })?;
                receipt = Some(ReceiptUpload {
                    data: data.to_vec(),
                    content_type,
                });
            }
            _ => {}
        }
    }

    let input = input.ok_or_else(|| {
        AppError::ValidationError("Multipart request is missing the sale part".to_string())
    })?;

    Ok((input, receipt))
}

/// GET /api/sales
pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SaleListQuery>,
) -> Response {
    let service = SaleService::new(state.db.clone());

    match service.list_sales(&user, query).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/:id
pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    let service = SaleService::new(state.db.clone());

    match service.get_sale(&user, id).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sales/:id/receipt
pub async fn get_receipt(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    let service = SaleService::new(state.db.clone());

    match service.get_receipt(&user, id).await {
        Ok(receipt) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, receipt.content_type)],
            receipt.data,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/sales/:id/cancel
pub async fn cancel_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<CancelSaleInput>,
) -> Response {
    let service = SaleService::new(state.db.clone());

    match service.cancel_sale(&user, id, input).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/sales/:id/refund (admin)
pub async fn refund_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<RefundSaleInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = SaleService::new(state.db.clone());

    match service.refund_sale(&user, id, input).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/sales/:id/status (admin)
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }
    let service = SaleService::new(state.db.clone());

    match service.override_status(&user, id, input).await {
        Ok(sale) => (StatusCode::OK, Json(sale)).into_response(),
        Err(e) => e.into_response(),
    }
}
