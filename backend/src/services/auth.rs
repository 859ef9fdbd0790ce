//! Authentication service
//!
//! Email/password login, user registration (admin only) and profile
//! management. Passwords are stored as bcrypt hashes; sessions are
//! stateless JWTs carrying the user's store and role.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::{auth::Claims, AuthUser};
use crate::models::UserRole;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtConfig,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Registration request, admin only
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub role: String,
    pub store_id: Uuid,
}

/// Profile update request; absent fields stay unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Login response: token plus the authenticated profile
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub store_id: Uuid,
    pub store_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    store_id: Uuid,
    store_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.name, u.role::text AS role,
           u.store_id, st.name AS store_name, u.is_active, u.created_at
    FROM users u
    JOIN stores st ON st.id = u.store_id
"#;

impl AuthService {
    pub fn new(db: PgPool, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Verify credentials and issue a token. Disabled accounts cannot log in.
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.email = $1", USER_SELECT))
            .bind(&input.email)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        if !row.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let role = parse_role(&row.role)?;
        let token = self.issue_token(&row, role)?;

        tracing::info!(email = %row.email, "user logged in");

        Ok(LoginResponse {
            token,
            user: profile_from_row(row, role),
        })
    }

    /// Create a user account attached to a store. Only admins may call this.
    pub async fn register(&self, actor: &AuthUser, input: RegisterInput) -> AppResult<UserProfile> {
        actor.require_admin()?;

        input.validate().map_err(validation_error)?;

        let role = UserRole::parse(&input.role).ok_or_else(|| AppError::Validation {
            field: "role".to_string(),
            message: format!("Unknown role: {}", input.role),
        })?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&input.email)
            .fetch_one(&self.db)
            .await?;
        if existing > 0 {
            return Err(AppError::DuplicateKey {
                field: "email".to_string(),
            });
        }

        let store_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE id = $1")
            .bind(input.store_id)
            .fetch_one(&self.db)
            .await?;
        if store_exists == 0 {
            return Err(AppError::NotFound("Store".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, name, role, store_id)
            VALUES ($1, $2, $3, $4::user_role, $5)
            RETURNING id
            "#,
        )
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.name)
        .bind(role.as_str())
        .bind(input.store_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(email = %input.email, role = %role.as_str(), "user registered");

        self.profile(user_id).await
    }

    /// Profile of an existing user.
    pub async fn profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", USER_SELECT))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        let role = parse_role(&row.role)?;
        Ok(profile_from_row(row, role))
    }

    /// Update the caller's own name or password.
    pub async fn update_profile(
        &self,
        actor: &AuthUser,
        input: UpdateProfileInput,
    ) -> AppResult<UserProfile> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name cannot be empty".to_string(),
                });
            }
        }

        let password_hash = match &input.password {
            Some(password) => {
                if password.len() < 8 {
                    return Err(AppError::Validation {
                        field: "password".to_string(),
                        message: "Password must be at least 8 characters".to_string(),
                    });
                }
                Some(
                    hash(password, DEFAULT_COST).map_err(|e| {
                        AppError::Internal(format!("Password hashing failed: {}", e))
                    })?,
                )
            }
            None => None,
        };

        sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                password_hash = COALESCE($2, password_hash),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&input.name)
        .bind(&password_hash)
        .bind(actor.user_id)
        .execute(&self.db)
        .await?;

        self.profile(actor.user_id).await
    }

    fn issue_token(&self, row: &UserRow, role: UserRole) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: row.id.to_string(),
            store_id: row.store_id.to_string(),
            role: role.as_str().to_string(),
            name: row.name.clone(),
            exp: (now + Duration::seconds(self.jwt.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

fn parse_role(raw: &str) -> AppResult<UserRole> {
    UserRole::parse(raw)
        .ok_or_else(|| AppError::Internal(format!("Unknown role in storage: {}", raw)))
}

fn profile_from_row(row: UserRow, role: UserRole) -> UserProfile {
    UserProfile {
        id: row.id,
        email: row.email,
        name: row.name,
        role,
        store_id: row.store_id,
        store_name: row.store_name,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

/// Map a validator error set onto the first offending field.
fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let (field, field_errors) = errors
        .field_errors()
        .into_iter()
        .next()
        .map(|(f, e)| (f.to_string(), e.clone()))
        .unwrap_or_else(|| ("input".to_string(), Vec::new()));

    let message = field_errors
        .first()
        .and_then(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value for {}", field));

    AppError::Validation { field, message }
}
