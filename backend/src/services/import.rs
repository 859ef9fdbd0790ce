//! CSV catalog import
//!
//! Bulk-loads products or stores from an uploaded CSV file. Each import
//! runs in one transaction: any bad row (or a duplicate item code) rolls
//! the whole file back.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// CSV import service
#[derive(Clone)]
pub struct ImportService {
    db: PgPool,
}

/// Which table an uploaded CSV targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportModel {
    Products,
    Stores,
}

impl ImportModel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "products" => Some(ImportModel::Products),
            "stores" => Some(ImportModel::Stores),
            _ => None,
        }
    }
}

/// Expected product CSV columns
#[derive(Debug, Deserialize)]
struct ProductCsvRow {
    item_code: String,
    name: String,
    #[serde(default)]
    variant_name: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
}

/// Expected store CSV columns
#[derive(Debug, Deserialize)]
struct StoreCsvRow {
    name: String,
    location: String,
    #[serde(default)]
    contact_number: Option<String>,
}

impl ImportService {
    /// Create a new ImportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Import a CSV file into the named model. Returns the row count.
    pub async fn import_csv(&self, model: ImportModel, data: &[u8]) -> AppResult<usize> {
        match model {
            ImportModel::Products => self.import_products(data).await,
            ImportModel::Stores => self.import_stores(data).await,
        }
    }

    async fn import_products(&self, data: &[u8]) -> AppResult<usize> {
        let rows = parse_product_rows(data)?;

        let mut tx = self.db.begin().await?;
        let mut imported = 0;

        for row in &rows {
            let existing: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE item_code = $1")
                    .bind(&row.item_code)
                    .fetch_one(&mut *tx)
                    .await?;
            if existing > 0 {
                return Err(AppError::DuplicateKey {
                    field: "item_code".to_string(),
                });
            }

            sqlx::query(
                r#"
                INSERT INTO products (item_code, name, variant_name, department, category,
                                      subcategory, description, price)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(&row.item_code)
            .bind(&row.name)
            .bind(&row.variant_name)
            .bind(&row.department)
            .bind(&row.category)
            .bind(&row.subcategory)
            .bind(&row.description)
            .bind(row.price)
            .execute(&mut *tx)
            .await?;
            imported += 1;
        }

        tx.commit().await?;

        tracing::info!(imported, "product CSV imported");

        Ok(imported)
    }

    async fn import_stores(&self, data: &[u8]) -> AppResult<usize> {
        let rows = parse_store_rows(data)?;

        let mut tx = self.db.begin().await?;
        let mut imported = 0;

        for row in &rows {
            sqlx::query("INSERT INTO stores (name, location, contact_number) VALUES ($1, $2, $3)")
                .bind(&row.name)
                .bind(&row.location)
                .bind(&row.contact_number)
                .execute(&mut *tx)
                .await?;
            imported += 1;
        }

        tx.commit().await?;

        tracing::info!(imported, "store CSV imported");

        Ok(imported)
    }
}

fn parse_product_rows(data: &[u8]) -> AppResult<Vec<ProductCsvRow>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ProductCsvRow>().enumerate() {
        let row = result.map_err(|e| {
            AppError::ValidationError(format!("CSV row {}: {}", index + 1, e))
        })?;
        if row.price < Decimal::ZERO {
            return Err(AppError::ValidationError(format!(
                "CSV row {}: price cannot be negative",
                index + 1
            )));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn parse_store_rows(data: &[u8]) -> AppResult<Vec<StoreCsvRow>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<StoreCsvRow>().enumerate() {
        let row = result.map_err(|e| {
            AppError::ValidationError(format!("CSV row {}: {}", index + 1, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}
