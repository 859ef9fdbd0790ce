//! Store management service
//!
//! Admin-only CRUD over store locations. Stores are deactivated rather than
//! deleted so historical sales keep their store reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Store management service
#[derive(Clone)]
pub struct StoreService {
    db: PgPool,
}

/// A store location
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoreInput {
    pub name: String,
    pub location: String,
    pub contact_number: Option<String>,
}

/// Partial update; absent fields stay unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateStoreInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub is_active: Option<bool>,
}

const STORE_COLUMNS: &str = "id, name, location, contact_number, is_active, created_at, updated_at";

impl StoreService {
    /// Create a new StoreService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_store(&self, input: CreateStoreInput) -> AppResult<Store> {
        validate_store_fields(&input.name, &input.location)?;

        let store = sqlx::query_as::<_, Store>(&format!(
            "INSERT INTO stores (name, location, contact_number) VALUES ($1, $2, $3) RETURNING {}",
            STORE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.contact_number)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(store = %store.name, "store created");

        Ok(store)
    }

    /// All stores, active first, then by name.
    pub async fn list_stores(&self) -> AppResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(&format!(
            "SELECT {} FROM stores ORDER BY is_active DESC, name",
            STORE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(stores)
    }

    pub async fn get_store(&self, id: Uuid) -> AppResult<Store> {
        sqlx::query_as::<_, Store>(&format!("SELECT {} FROM stores WHERE id = $1", STORE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Store".to_string()))
    }

    pub async fn update_store(&self, id: Uuid, input: UpdateStoreInput) -> AppResult<Store> {
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name cannot be empty".to_string(),
                });
            }
        }

        sqlx::query_as::<_, Store>(&format!(
            r#"
            UPDATE stores
            SET name = COALESCE($1, name),
                location = COALESCE($2, location),
                contact_number = COALESCE($3, contact_number),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            STORE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.location)
        .bind(&input.contact_number)
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))
    }

    /// Deactivate: historical sales keep their reference.
    pub async fn delete_store(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE stores SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Store".to_string()));
        }
        tracing::info!(store_id = %id, "store deactivated");
        Ok(())
    }
}

fn validate_store_fields(name: &str, location: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if location.trim().is_empty() {
        return Err(AppError::Validation {
            field: "location".to_string(),
            message: "Location is required".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_fields_required() {
        assert!(validate_store_fields("Downtown", "12 Main St").is_ok());
        assert!(validate_store_fields("", "12 Main St").is_err());
        assert!(validate_store_fields("Downtown", "  ").is_err());
    }
}
