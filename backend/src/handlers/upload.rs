//! Bulk upload handlers

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::import::ImportModel;
use crate::services::ImportService;
use crate::AppState;

/// POST /api/uploads/csv (admin): `file` CSV part + `model` field naming
/// the target (`products` or `stores`).
pub async fn import_csv(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Response {
    if let Err(e) = user.require_admin() {
        return e.into_response();
    }

    let mut model: Option<ImportModel> = None;
    let mut data: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return AppError::ValidationError(format!("Invalid multipart field: {}", e))
                    .into_response()
            }
        };

        match field.name() {
            Some("model") => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(e) => {
                        return AppError::ValidationError(format!("Invalid model field: {}", e))
                            .into_response()
                    }
                };
                model = match ImportModel::parse(text.trim()) {
                    Some(model) => Some(model),
                    None => {
                        return AppError::ValidationError(format!(
                            "Unknown import model: {}",
                            text.trim()
                        ))
                        .into_response()
                    }
                };
            }
            Some("file") => {
                data = match field.bytes().await {
                    Ok(bytes) => Some(bytes.to_vec()),
                    Err(e) => {
                        return AppError::ValidationError(format!("Invalid file upload: {}", e))
                            .into_response()
                    }
                };
            }
            _ => {}
        }
    }

    let (model, data) = match (model, data) {
        (Some(model), Some(data)) => (model, data),
        _ => {
            return AppError::ValidationError(
                "Upload requires both a model field and a file part".to_string(),
            )
            .into_response()
        }
    };

    let service = ImportService::new(state.db.clone());

    match service.import_csv(model, &data).await {
        Ok(imported) => (StatusCode::OK, Json(json!({ "imported": imported }))).into_response(),
        Err(e) => e.into_response(),
    }
}
