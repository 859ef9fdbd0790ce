//! Authentication handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::middleware::CurrentUser;
use crate::services::auth::{LoginInput, RegisterInput, UpdateProfileInput};
use crate::services::AuthService;
use crate::AppState;

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, Json(input): Json<LoginInput>) -> Response {
    let service = AuthService::new(state.db.clone(), state.config.jwt.clone());

    match service.login(input).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/auth/register (admin)
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RegisterInput>,
) -> Response {
    let service = AuthService::new(state.db.clone(), state.config.jwt.clone());

    match service.register(&user, input).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Response {
    let service = AuthService::new(state.db.clone(), state.config.jwt.clone());

    match service.profile(user.user_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> Response {
    let service = AuthService::new(state.db.clone(), state.config.jwt.clone());

    match service.update_profile(&user, input).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}
