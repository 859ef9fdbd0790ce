//! Product catalog service
//!
//! CRUD over the product catalog plus the search surface the sale entry
//! screens drive: keyword search, catalog-placement filters, distinct
//! filter values and the item-code lookup used by barcode scanners.
//! Products are never hard-deleted, only deactivated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, PaginationMeta};
use shared::validation::{is_valid_item_code, round_money};

/// Default page size for catalog listings.
const PRODUCTS_PAGE_SIZE: u32 = 20;

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// A catalog product
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub item_code: String,
    pub name: String,
    pub variant_name: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub item_code: String,
    pub name: String,
    pub variant_name: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Partial update; absent fields stay unchanged
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub variant_name: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
}

/// One record of a bulk update request
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub update: UpdateProductInput,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateInput {
    pub products: Vec<BulkUpdateRecord>,
}

/// Per-record outcome of a bulk update; one failure never aborts the rest
#[derive(Debug, Serialize)]
pub struct BulkUpdateResult {
    pub successful: Vec<Product>,
    pub failed: Vec<BulkUpdateFailure>,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateFailure {
    pub id: Uuid,
    pub error: String,
}

/// Basic listing query
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
}

/// Advanced search query
#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchQuery {
    pub keyword: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Search response: matching page plus the filter values the UI offers
#[derive(Debug, Serialize)]
pub struct ProductSearchResult {
    pub data: Vec<Product>,
    pub pagination: PaginationMeta,
    pub filters: SearchFilters,
}

#[derive(Debug, Serialize)]
pub struct SearchFilters {
    pub departments: Vec<String>,
    pub categories: Vec<String>,
    pub subcategories: Vec<String>,
    pub price_range: PriceRange,
}

#[derive(Debug, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

const PRODUCT_COLUMNS: &str = "id, item_code, name, variant_name, department, category, \
     subcategory, description, price, is_active, created_at, updated_at";

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product. Item codes are unique across the catalog.
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_product_fields(&input.item_code, &input.name, input.price)?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE item_code = $1")
                .bind(&input.item_code)
                .fetch_one(&self.db)
                .await?;
        if existing > 0 {
            return Err(AppError::DuplicateKey {
                field: "item_code".to_string(),
            });
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (item_code, name, variant_name, department, category,
                                  subcategory, description, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.item_code)
        .bind(&input.name)
        .bind(&input.variant_name)
        .bind(&input.department)
        .bind(&input.category)
        .bind(&input.subcategory)
        .bind(&input.description)
        .bind(input.price)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(item_code = %product.item_code, "product created");

        Ok(rounded(product))
    }

    /// Paginated listing of active products, newest first.
    pub async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> AppResult<PaginatedResponse<Product>> {
        let page = query.page.unwrap_or(1).max(1);
        let keyword = non_empty(query.keyword);
        let category = non_empty(query.category);

        let filter = r#"
            WHERE is_active
              AND ($1::text IS NULL
                   OR name ILIKE '%' || $1 || '%'
                   OR item_code ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR category = $2)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {}", filter))
                .bind(&keyword)
                .bind(&category)
                .fetch_one(&self.db)
                .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
            PRODUCT_COLUMNS, filter
        ))
        .bind(&keyword)
        .bind(&category)
        .bind(PRODUCTS_PAGE_SIZE as i64)
        .bind(((page - 1) * PRODUCTS_PAGE_SIZE) as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: products.into_iter().map(rounded).collect(),
            pagination: PaginationMeta::new(page, PRODUCTS_PAGE_SIZE, total as u64),
        })
    }

    /// Advanced search over the active catalog with filter metadata.
    pub async fn search_products(
        &self,
        query: ProductSearchQuery,
    ) -> AppResult<ProductSearchResult> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(PRODUCTS_PAGE_SIZE).clamp(1, 100);
        let keyword = non_empty(query.keyword);
        let department = non_empty(query.department);
        let category = non_empty(query.category);
        let subcategory = non_empty(query.subcategory);

        let (sort_column, sort_order) =
            resolve_sort(query.sort_by.as_deref(), query.sort_order.as_deref())?;

        let filter = r#"
            WHERE is_active
              AND ($1::text IS NULL
                   OR name ILIKE '%' || $1 || '%'
                   OR item_code ILIKE '%' || $1 || '%'
                   OR description ILIKE '%' || $1 || '%'
                   OR variant_name ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR department = $2)
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL OR subcategory = $4)
              AND ($5::numeric IS NULL OR price >= $5)
              AND ($6::numeric IS NULL OR price <= $6)
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {}", filter))
                .bind(&keyword)
                .bind(&department)
                .bind(&category)
                .bind(&subcategory)
                .bind(query.min_price)
                .bind(query.max_price)
                .fetch_one(&self.db)
                .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products {} ORDER BY {} {} LIMIT $7 OFFSET $8",
            PRODUCT_COLUMNS, filter, sort_column, sort_order
        ))
        .bind(&keyword)
        .bind(&department)
        .bind(&category)
        .bind(&subcategory)
        .bind(query.min_price)
        .bind(query.max_price)
        .bind(limit as i64)
        .bind(((page - 1) * limit) as i64)
        .fetch_all(&self.db)
        .await?;

        let filters = self.search_filters().await?;

        Ok(ProductSearchResult {
            data: products.into_iter().map(rounded).collect(),
            pagination: PaginationMeta::new(page, limit, total as u64),
            filters,
        })
    }

    /// Distinct category values over active products.
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.distinct_values("category", None).await
    }

    /// Distinct department values over active products.
    pub async fn departments(&self) -> AppResult<Vec<String>> {
        self.distinct_values("department", None).await
    }

    /// Distinct subcategories, optionally narrowed to one category.
    pub async fn subcategories(&self, category: Option<String>) -> AppResult<Vec<String>> {
        self.distinct_values("subcategory", non_empty(category)).await
    }

    /// Active product by item code (barcode lookup).
    pub async fn get_by_item_code(&self, item_code: &str) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE item_code = $1 AND is_active",
            PRODUCT_COLUMNS
        ))
        .bind(item_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        Ok(rounded(product))
    }

    /// Product by id, active or not.
    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;
        Ok(rounded(product))
    }

    /// Partial update of a product.
    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "price".to_string(),
                    message: "Price cannot be negative".to_string(),
                });
            }
        }
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "name".to_string(),
                    message: "Name cannot be empty".to_string(),
                });
            }
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                variant_name = COALESCE($2, variant_name),
                department = COALESCE($3, department),
                category = COALESCE($4, category),
                subcategory = COALESCE($5, subcategory),
                description = COALESCE($6, description),
                price = COALESCE($7, price),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.variant_name)
        .bind(&input.department)
        .bind(&input.category)
        .bind(&input.subcategory)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.is_active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(rounded(product))
    }

    /// Soft-delete: the product stays referenceable from past sales.
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        tracing::info!(product_id = %id, "product deactivated");
        Ok(())
    }

    /// Apply independent updates to many products. Each record succeeds or
    /// fails on its own; the batch never aborts.
    pub async fn bulk_update(&self, input: BulkUpdateInput) -> AppResult<BulkUpdateResult> {
        let mut successful = Vec::new();
        let mut failed = Vec::new();

        for record in input.products {
            match self.update_product(record.id, record.update).await {
                Ok(product) => successful.push(product),
                Err(e) => failed.push(BulkUpdateFailure {
                    id: record.id,
                    error: e.to_string(),
                }),
            }
        }

        Ok(BulkUpdateResult { successful, failed })
    }

    async fn search_filters(&self) -> AppResult<SearchFilters> {
        let departments = self.distinct_values("department", None).await?;
        let categories = self.distinct_values("category", None).await?;
        let subcategories = self.distinct_values("subcategory", None).await?;

        let (min, max) = sqlx::query_as::<_, (Option<Decimal>, Option<Decimal>)>(
            "SELECT MIN(price), MAX(price) FROM products WHERE is_active",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(SearchFilters {
            departments,
            categories,
            subcategories,
            price_range: PriceRange {
                min: min.map(round_money).unwrap_or(Decimal::ZERO),
                max: max.map(round_money).unwrap_or(Decimal::ZERO),
            },
        })
    }

    async fn distinct_values(
        &self,
        column: &str,
        category: Option<String>,
    ) -> AppResult<Vec<String>> {
        // column is a fixed name chosen by the caller, never input
        let sql = format!(
            r#"
            SELECT DISTINCT {col} FROM products
            WHERE is_active AND {col} IS NOT NULL
              AND ($1::text IS NULL OR category = $1)
            ORDER BY {col}
            "#,
            col = column
        );
        let values = sqlx::query_scalar::<_, String>(&sql)
            .bind(&category)
            .fetch_all(&self.db)
            .await?;
        Ok(values)
    }
}

fn validate_product_fields(item_code: &str, name: &str, price: Decimal) -> AppResult<()> {
    if !is_valid_item_code(item_code) {
        return Err(AppError::Validation {
            field: "item_code".to_string(),
            message: "Item code must be 1-64 alphanumeric characters, dashes or underscores"
                .to_string(),
        });
    }
    if name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if price < Decimal::ZERO {
        return Err(AppError::Validation {
            field: "price".to_string(),
            message: "Price cannot be negative".to_string(),
        });
    }
    Ok(())
}

/// Whitelisted sort columns for the search endpoint.
fn resolve_sort(
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> AppResult<(&'static str, &'static str)> {
    let column = match sort_by.unwrap_or("created_at") {
        "name" => "name",
        "price" => "price",
        "item_code" => "item_code",
        "created_at" => "created_at",
        other => {
            return Err(AppError::ValidationError(format!(
                "Unsupported sort field: {}",
                other
            )))
        }
    };
    let order = match sort_order.unwrap_or("desc") {
        "asc" | "ASC" => "ASC",
        "desc" | "DESC" => "DESC",
        other => {
            return Err(AppError::ValidationError(format!(
                "Unsupported sort order: {}",
                other
            )))
        }
    };
    Ok((column, order))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn rounded(mut product: Product) -> Product {
    product.price = round_money(product.price);
    product
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_product_fields() {
        assert!(validate_product_fields("SKU-001", "Drip Coffee", "12.50".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_rejects_bad_item_code() {
        assert!(validate_product_fields("", "Name", Decimal::ONE).is_err());
        assert!(validate_product_fields("has space", "Name", Decimal::ONE).is_err());
    }

    #[test]
    fn test_rejects_negative_price() {
        let result = validate_product_fields("SKU-001", "Name", "-1".parse().unwrap());
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_rejects_blank_name() {
        assert!(validate_product_fields("SKU-001", "   ", Decimal::ONE).is_err());
    }

    #[test]
    fn test_sort_whitelist() {
        assert_eq!(resolve_sort(None, None).unwrap(), ("created_at", "DESC"));
        assert_eq!(resolve_sort(Some("price"), Some("asc")).unwrap(), ("price", "ASC"));
        assert!(resolve_sort(Some("password_hash"), None).is_err());
        assert!(resolve_sort(Some("name"), Some("sideways")).is_err());
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
