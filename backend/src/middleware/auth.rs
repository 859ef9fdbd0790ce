//! Authentication middleware
//!
//! JWT bearer authentication and store-scope access control. The resolved
//! identity is attached to the request as an extension and pulled out by
//! handlers through the [`CurrentUser`] extractor, so no handler depends on
//! ambient session state.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::UserRole;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub role: UserRole,
    pub name: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Reject non-admin callers.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Not authorized to access this data".to_string(),
            ))
        }
    }

    /// Whether this caller may read or mutate data of the given store.
    pub fn can_access_store(&self, store_id: Uuid) -> bool {
        self.is_admin() || self.store_id == store_id
    }

    /// Resolve a requested store selector against this caller's identity.
    ///
    /// Admins may name any store or `all`; everyone else is pinned to their
    /// own store, and naming a foreign store is a Forbidden error rather
    /// than a silent narrowing.
    pub fn resolve_store_scope(&self, requested: Option<&str>) -> AppResult<StoreScope> {
        match requested {
            None | Some("all") | Some("") => {
                if self.is_admin() {
                    Ok(StoreScope::All)
                } else {
                    Ok(StoreScope::Single(self.store_id))
                }
            }
            Some(raw) => {
                let store_id = Uuid::parse_str(raw).map_err(|_| {
                    AppError::ValidationError(format!("Invalid store selector: {}", raw))
                })?;
                if self.can_access_store(store_id) {
                    Ok(StoreScope::Single(store_id))
                } else {
                    Err(AppError::Forbidden(
                        "Not authorized to view another store's data".to_string(),
                    ))
                }
            }
        }
    }
}

/// The set of stores a query is allowed to touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreScope {
    All,
    Single(Uuid),
}

impl StoreScope {
    /// Store id to bind into `($n::uuid IS NULL OR store_id = $n)` filters.
    pub fn as_filter(&self) -> Option<Uuid> {
        match self {
            StoreScope::All => None,
            StoreScope::Single(id) => Some(*id),
        }
    }

    pub fn includes(&self, store_id: Uuid) -> bool {
        match self {
            StoreScope::All => true,
            StoreScope::Single(id) => *id == store_id,
        }
    }
}

/// Authentication middleware that validates JWT tokens.
/// The token is decoded inline against the configured secret to avoid a
/// state dependency in the middleware layer.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("RST__JWT__SECRET")
        .or_else(|_| std::env::var("RST_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = match decode_jwt(token, &jwt_secret) {
        Ok(claims) => claims,
        Err(msg) => {
            return unauthorized_response(&msg);
        }
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let store_id = match Uuid::parse_str(&claims.store_id) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid store ID in token"),
    };

    let role = match UserRole::parse(&claims.role) {
        Some(role) => role,
        None => return unauthorized_response("Invalid role in token"),
    };

    let auth_user = AuthUser {
        user_id,
        store_id,
        role,
        name: claims.name,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub store_id: String,
    pub role: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate a JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the authenticated user.
/// Use this in handlers to get the current user.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: crate::error::ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Authentication required".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, store: Uuid) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            store_id: store,
            role,
            name: "Test".to_string(),
        }
    }

    #[test]
    fn test_admin_accesses_any_store() {
        let admin = user(UserRole::Admin, Uuid::new_v4());
        assert!(admin.can_access_store(Uuid::new_v4()));
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_salesperson_confined_to_own_store() {
        let store = Uuid::new_v4();
        let sp = user(UserRole::Salesperson, store);
        assert!(sp.can_access_store(store));
        assert!(!sp.can_access_store(Uuid::new_v4()));
        assert!(sp.require_admin().is_err());
    }

    #[test]
    fn test_admin_all_scope() {
        let admin = user(UserRole::Admin, Uuid::new_v4());
        assert_eq!(admin.resolve_store_scope(Some("all")).unwrap(), StoreScope::All);
        assert_eq!(admin.resolve_store_scope(None).unwrap(), StoreScope::All);
    }

    #[test]
    fn test_salesperson_all_narrows_to_own_store() {
        let store = Uuid::new_v4();
        let sp = user(UserRole::Salesperson, store);
        assert_eq!(
            sp.resolve_store_scope(Some("all")).unwrap(),
            StoreScope::Single(store)
        );
        assert_eq!(sp.resolve_store_scope(None).unwrap(), StoreScope::Single(store));
    }

    #[test]
    fn test_salesperson_foreign_store_forbidden() {
        let sp = user(UserRole::Salesperson, Uuid::new_v4());
        let other = Uuid::new_v4();
        let result = sp.resolve_store_scope(Some(&other.to_string()));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_invalid_store_selector_rejected() {
        let admin = user(UserRole::Admin, Uuid::new_v4());
        let result = admin.resolve_store_scope(Some("not-a-uuid"));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
