//! Sale ledger service: creation, lifecycle transitions, and queries
//!
//! Owns the sale aggregate: line-item validation, server-side totals, the
//! per-month sale number sequence, and the completed → cancelled/refunded
//! state machine.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ReceiptInfo, SaleStatus};
use shared::types::DateRange;
use shared::validation::{format_sale_number, round_money};

/// Page size for sale listings.
const SALES_PAGE_SIZE: u32 = 10;

/// Non-admin cancellation window in hours.
const CANCELLATION_WINDOW_HOURS: i64 = 24;

/// Sale ledger service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    /// Target store; admins may name any store, others are pinned to their own
    pub store_id: Option<Uuid>,
    pub customer_name: Option<String>,
    /// Free-text attribution, may differ from the authenticated user
    pub salesperson_name: Option<String>,
    pub items: Vec<CreateSaleItem>,
}

/// One line item of a sale submission. The price is the unit price captured
/// at selection time; it is stored verbatim and never re-read from the
/// catalog afterwards.
#[derive(Debug, Deserialize)]
pub struct CreateSaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}

/// Receipt image attached to a sale submission
#[derive(Debug)]
pub struct ReceiptUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Input for cancelling a sale
#[derive(Debug, Deserialize)]
pub struct CancelSaleInput {
    pub reason: String,
}

/// Input for refunding a sale; absent items means a full refund
#[derive(Debug, Deserialize)]
pub struct RefundSaleInput {
    pub reason: String,
    pub items: Option<Vec<RefundItemInput>>,
}

#[derive(Debug, Deserialize)]
pub struct RefundItemInput {
    pub sale_item_id: Uuid,
    pub quantity: i32,
}

/// Input for the administrative status override
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

/// Listing filters for `GET /sales`
#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub store: Option<String>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
    /// Free-text search over sale number and customer name
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// Database row for a sale with store and salesperson names
#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    sale_number: String,
    store_id: Uuid,
    store_name: String,
    salesperson_id: Uuid,
    salesperson: String,
    salesperson_name: Option<String>,
    customer_name: Option<String>,
    total_amount: Decimal,
    status: String,
    has_receipt: bool,
    receipt_content_type: Option<String>,
    cancel_reason: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<Uuid>,
    refund_reason: Option<String>,
    refunded_at: Option<DateTime<Utc>>,
    refunded_by: Option<Uuid>,
    refund_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for a sale line item with product info
#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    product_name: String,
    item_code: String,
    quantity: i32,
    price: Decimal,
    total: Decimal,
}

/// Reference to a store in sale payloads
#[derive(Debug, Clone, Serialize)]
pub struct StoreRef {
    pub id: Uuid,
    pub name: String,
}

/// Reference to a user in sale payloads
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
}

/// A line item in sale payloads
#[derive(Debug, Clone, Serialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub item_code: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

/// A refunded line item in sale payloads
#[derive(Debug, Clone, Serialize)]
pub struct RefundedItem {
    pub sale_item_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

/// Sale payload returned by the API. The receipt binary is always stripped
/// and replaced with a content-type + existence marker.
#[derive(Debug, Clone, Serialize)]
pub struct Sale {
    pub id: Uuid,
    pub sale_number: String,
    pub store: StoreRef,
    pub salesperson: UserRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesperson_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub items: Vec<SaleItem>,
    pub total_amount: Decimal,
    pub status: SaleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_photo: Option<ReceiptInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refunded_items: Vec<RefundedItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated sale listing
#[derive(Debug, Serialize)]
pub struct SaleList {
    pub sales: Vec<Sale>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

/// Stored receipt image
pub struct Receipt {
    pub data: Vec<u8>,
    pub content_type: String,
}

const SALE_SELECT: &str = r#"
    SELECT s.id, s.sale_number, s.store_id, st.name AS store_name,
           s.salesperson_id, u.name AS salesperson, s.salesperson_name,
           s.customer_name, s.total_amount, s.status::text AS status,
           (s.receipt_photo IS NOT NULL) AS has_receipt, s.receipt_content_type,
           s.cancel_reason, s.cancelled_at, s.cancelled_by,
           s.refund_reason, s.refunded_at, s.refunded_by, s.refund_amount,
           s.created_at, s.updated_at
    FROM sales s
    JOIN stores st ON st.id = s.store_id
    JOIN users u ON u.id = s.salesperson_id
"#;

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a new sale in `completed` status.
    pub async fn create_sale(
        &self,
        actor: &AuthUser,
        input: CreateSaleInput,
        receipt: Option<ReceiptUpload>,
    ) -> AppResult<Sale> {
        let store_id = match input.store_id {
            Some(id) if actor.is_admin() => id,
            Some(id) if id != actor.store_id => {
                return Err(AppError::Forbidden(
                    "Not authorized to create a sale for another store".to_string(),
                ));
            }
            _ => actor.store_id,
        };

        validate_items(&input.items)?;

        // Verify the store exists (an admin may name any store id)
        let store_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stores WHERE id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;
        if store_exists == 0 {
            return Err(AppError::NotFound("Store".to_string()));
        }

        // Every product reference must resolve before anything is written.
        // Inactive products are still valid references.
        let product_ids: Vec<Uuid> = input.items.iter().map(|i| i.product_id).collect();
        let found: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1)")
                .bind(&product_ids)
                .fetch_all(&self.db)
                .await?;
        for item in &input.items {
            if !found.contains(&item.product_id) {
                return Err(AppError::NotFound(format!("Product {}", item.product_id)));
            }
        }

        let total_amount = compute_total(&input.items);
        let now = Utc::now();

        let mut tx = self.db.begin().await?;

        let sequence = next_month_sequence(&mut tx, now).await?;
        let sale_number = format_sale_number(now.year(), now.month(), sequence);

        let (receipt_data, receipt_content_type) = match &receipt {
            Some(upload) => (Some(upload.data.as_slice()), Some(upload.content_type.clone())),
            None => (None, None),
        };

        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales (sale_number, store_id, salesperson_id, salesperson_name,
                               customer_name, total_amount, status,
                               receipt_photo, receipt_content_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'completed', $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&sale_number)
        .bind(store_id)
        .bind(actor.user_id)
        .bind(&input.salesperson_name)
        .bind(&input.customer_name)
        .bind(total_amount)
        .bind(receipt_data)
        .bind(&receipt_content_type)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, price, total, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.price * Decimal::from(item.quantity))
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(sale_number = %sale_number, store_id = %store_id, "sale recorded");

        self.fetch_sale(sale_id).await
    }

    /// List sales visible to the caller, newest first.
    pub async fn list_sales(&self, actor: &AuthUser, query: SaleListQuery) -> AppResult<SaleList> {
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let store_filter = scope.as_filter();

        let range = match (query.start_date, query.end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        let start_bound = range.map(|r| r.start_bound());
        let end_bound = range.map(|r| r.end_bound());

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let page = query.page.unwrap_or(1).max(1);

        let filter_clause = r#"
            WHERE ($1::uuid IS NULL OR s.store_id = $1)
              AND ($2::timestamptz IS NULL OR s.created_at >= $2)
              AND ($3::timestamptz IS NULL OR s.created_at < $3)
              AND ($4::text IS NULL
                   OR s.sale_number ILIKE '%' || $4 || '%'
                   OR s.customer_name ILIKE '%' || $4 || '%')
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM sales s {}",
            filter_clause
        ))
        .bind(store_filter)
        .bind(start_bound)
        .bind(end_bound)
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{} {} ORDER BY s.created_at DESC LIMIT $5 OFFSET $6",
            SALE_SELECT, filter_clause
        ))
        .bind(store_filter)
        .bind(start_bound)
        .bind(end_bound)
        .bind(&search)
        .bind(SALES_PAGE_SIZE as i64)
        .bind(((page - 1) * SALES_PAGE_SIZE) as i64)
        .fetch_all(&self.db)
        .await?;

        let sale_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = self.fetch_items_for(&sale_ids).await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = item_rows
                .iter()
                .filter(|i| i.sale_id == row.id)
                .cloned()
                .collect();
            sales.push(build_sale(row, items, Vec::new())?);
        }

        let pages = (total as u64).div_ceil(SALES_PAGE_SIZE as u64) as u32;
        Ok(SaleList {
            sales,
            page,
            pages,
            total: total as u64,
        })
    }

    /// Get a sale by id; callers outside the owning store's scope get 403.
    pub async fn get_sale(&self, actor: &AuthUser, sale_id: Uuid) -> AppResult<Sale> {
        let sale = self.fetch_sale(sale_id).await?;
        if !actor.can_access_store(sale.store.id) {
            return Err(AppError::Forbidden(
                "Not authorized to view this sale".to_string(),
            ));
        }
        Ok(sale)
    }

    /// Get the stored receipt image for a sale.
    pub async fn get_receipt(&self, actor: &AuthUser, sale_id: Uuid) -> AppResult<Receipt> {
        let row = sqlx::query_as::<_, (Uuid, Option<Vec<u8>>, Option<String>)>(
            "SELECT store_id, receipt_photo, receipt_content_type FROM sales WHERE id = $1",
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if !actor.can_access_store(row.0) {
            return Err(AppError::Forbidden(
                "Not authorized to view this sale".to_string(),
            ));
        }

        match (row.1, row.2) {
            (Some(data), Some(content_type)) => Ok(Receipt { data, content_type }),
            _ => Err(AppError::NotFound("Receipt".to_string())),
        }
    }

    /// Cancel a completed sale. Non-admin callers may only cancel within the
    /// 24-hour window; totals and line items are left untouched.
    pub async fn cancel_sale(
        &self,
        actor: &AuthUser,
        sale_id: Uuid,
        input: CancelSaleInput,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            "SELECT store_id, status::text, created_at FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let (store_id, status, created_at) = sale;

        if !actor.can_access_store(store_id) {
            return Err(AppError::Forbidden(
                "Not authorized to cancel this sale".to_string(),
            ));
        }

        let status = parse_status(&status)?;
        if status != SaleStatus::Completed {
            return Err(AppError::InvalidStatusTransition(format!(
                "Cannot cancel a sale with status: {}",
                status
            )));
        }

        check_cancellation_window(created_at, Utc::now(), actor.is_admin())?;

        sqlx::query(
            r#"
            UPDATE sales
            SET status = 'cancelled', cancel_reason = $1, cancelled_at = NOW(),
                cancelled_by = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&input.reason)
        .bind(actor.user_id)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.fetch_sale(sale_id).await
    }

    /// Refund a completed sale, either in full or for a subset of its items.
    pub async fn refund_sale(
        &self,
        actor: &AuthUser,
        sale_id: Uuid,
        input: RefundSaleInput,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let sale = sqlx::query_as::<_, (Uuid, String, Decimal)>(
            "SELECT store_id, status::text, total_amount FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let (store_id, status, total_amount) = sale;

        if !actor.can_access_store(store_id) {
            return Err(AppError::Forbidden(
                "Not authorized to refund this sale".to_string(),
            ));
        }

        let status = parse_status(&status)?;
        if status != SaleStatus::Completed {
            return Err(AppError::InvalidStatusTransition(format!(
                "Cannot refund a sale with status: {}",
                status
            )));
        }

        let items = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal)>(
            "SELECT id, product_id, quantity, price FROM sale_items WHERE sale_id = $1 ORDER BY position",
        )
        .bind(sale_id)
        .fetch_all(&mut *tx)
        .await?;

        let sale_items: Vec<RefundableItem> = items
            .into_iter()
            .map(|(id, product_id, quantity, price)| RefundableItem {
                sale_item_id: id,
                product_id,
                quantity,
                price,
            })
            .collect();

        let refund = compute_refund(&sale_items, total_amount, input.items.as_deref())?;

        sqlx::query(
            r#"
            UPDATE sales
            SET status = 'refunded', refund_reason = $1, refunded_at = NOW(),
                refunded_by = $2, refund_amount = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&input.reason)
        .bind(actor.user_id)
        .bind(refund.amount)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        for line in &refund.items {
            sqlx::query(
                r#"
                INSERT INTO refund_items (sale_id, sale_item_id, product_id, quantity, price, total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale_id)
            .bind(line.sale_item_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .bind(line.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.fetch_sale(sale_id).await
    }

    /// Administrative status override. Bypasses the guarded transitions and
    /// their preconditions; the scope check still applies.
    pub async fn override_status(
        &self,
        actor: &AuthUser,
        sale_id: Uuid,
        input: UpdateStatusInput,
    ) -> AppResult<Sale> {
        let status = SaleStatus::parse(&input.status).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown sale status: {}", input.status))
        })?;

        let store_id = sqlx::query_scalar::<_, Uuid>("SELECT store_id FROM sales WHERE id = $1")
            .bind(sale_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        if !actor.can_access_store(store_id) {
            return Err(AppError::Forbidden(
                "Not authorized to update this sale".to_string(),
            ));
        }

        tracing::warn!(
            sale_id = %sale_id,
            status = %status,
            actor = %actor.user_id,
            "status override applied outside the guarded transitions"
        );

        sqlx::query("UPDATE sales SET status = $1::sale_status, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(sale_id)
            .execute(&self.db)
            .await?;

        self.fetch_sale(sale_id).await
    }

    /// Fetch a sale with items and refund lines, receipt stripped.
    async fn fetch_sale(&self, sale_id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(&format!("{} WHERE s.id = $1", SALE_SELECT))
            .bind(sale_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let items = self.fetch_items_for(&[sale_id]).await?;

        let refunded = sqlx::query_as::<_, (Uuid, Uuid, i32, Decimal, Decimal)>(
            "SELECT sale_item_id, product_id, quantity, price, total FROM refund_items WHERE sale_id = $1",
        )
        .bind(sale_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|(sale_item_id, product_id, quantity, price, total)| RefundedItem {
            sale_item_id,
            product_id,
            quantity,
            price: round_money(price),
            total: round_money(total),
        })
        .collect();

        build_sale(row, items, refunded)
    }

    async fn fetch_items_for(&self, sale_ids: &[Uuid]) -> AppResult<Vec<SaleItemRow>> {
        if sale_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT si.id, si.sale_id, si.product_id, p.name AS product_name,
                   p.item_code, si.quantity, si.price, si.total
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            WHERE si.sale_id = ANY($1)
            ORDER BY si.position
            "#,
        )
        .bind(sale_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

/// Validate a sale's line items: at least one, positive integer quantities,
/// non-negative captured prices.
fn validate_items(items: &[CreateSaleItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::Validation {
            field: "items".to_string(),
            message: "A sale must contain at least one line item".to_string(),
        });
    }
    for item in items {
        if item.quantity < 1 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Line item quantity must be a positive integer".to_string(),
            });
        }
        if item.price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "price".to_string(),
                message: "Line item price cannot be negative".to_string(),
            });
        }
    }
    Ok(())
}

/// Total amount of a sale: the sum of captured price times quantity over all
/// line items. Never recomputed from current catalog prices.
fn compute_total(items: &[CreateSaleItem]) -> Decimal {
    items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum()
}

/// Atomically claim the next sale sequence for the month of `now`.
/// The upsert makes concurrent creations within one month race-free.
async fn next_month_sequence(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    now: DateTime<Utc>,
) -> AppResult<u32> {
    let period = format!("{:02}{:02}", now.year().rem_euclid(100), now.month());
    let seq: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO sale_counters (period, seq) VALUES ($1, 1)
        ON CONFLICT (period) DO UPDATE SET seq = sale_counters.seq + 1
        RETURNING seq
        "#,
    )
    .bind(&period)
    .fetch_one(&mut **tx)
    .await?;
    Ok(seq as u32)
}

fn parse_status(raw: &str) -> AppResult<SaleStatus> {
    SaleStatus::parse(raw)
        .ok_or_else(|| AppError::Internal(format!("Unexpected sale status in storage: {}", raw)))
}

/// Enforce the cancellation window: admins cancel at any time, everyone else
/// only within 24 hours of the sale's creation.
fn check_cancellation_window(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    is_admin: bool,
) -> AppResult<()> {
    if is_admin {
        return Ok(());
    }
    let elapsed = now - created_at;
    if elapsed > chrono::Duration::hours(CANCELLATION_WINDOW_HOURS) {
        return Err(AppError::CancellationWindowExpired);
    }
    Ok(())
}

/// A sale line item as seen by the refund computation.
#[derive(Debug, Clone)]
struct RefundableItem {
    sale_item_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
}

#[derive(Debug)]
struct RefundLine {
    sale_item_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    total: Decimal,
}

#[derive(Debug)]
struct RefundComputation {
    amount: Decimal,
    items: Vec<RefundLine>,
}

/// Compute the refund amount and refunded item list.
///
/// With no requested items (or an empty list) the whole sale is refunded:
/// amount = totalAmount, items = the full item list. A partial refund checks
/// each requested line against the original purchase.
fn compute_refund(
    sale_items: &[RefundableItem],
    total_amount: Decimal,
    requested: Option<&[RefundItemInput]>,
) -> AppResult<RefundComputation> {
    let requested = match requested {
        Some(items) if !items.is_empty() => items,
        _ => {
            let items = sale_items
                .iter()
                .map(|item| RefundLine {
                    sale_item_id: item.sale_item_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    total: item.price * Decimal::from(item.quantity),
                })
                .collect();
            return Ok(RefundComputation {
                amount: total_amount,
                items,
            });
        }
    };

    let mut amount = Decimal::ZERO;
    let mut lines = Vec::with_capacity(requested.len());
    for refund_item in requested {
        let sale_item = sale_items
            .iter()
            .find(|item| item.sale_item_id == refund_item.sale_item_id)
            .ok_or_else(|| {
                AppError::RefundItemNotFound(refund_item.sale_item_id.to_string())
            })?;
        if refund_item.quantity < 1 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Refund quantity must be a positive integer".to_string(),
            });
        }
        if refund_item.quantity > sale_item.quantity {
            return Err(AppError::RefundQuantityExceeded(format!(
                "requested {} of {} purchased",
                refund_item.quantity, sale_item.quantity
            )));
        }
        let total = sale_item.price * Decimal::from(refund_item.quantity);
        amount += total;
        lines.push(RefundLine {
            sale_item_id: sale_item.sale_item_id,
            product_id: sale_item.product_id,
            quantity: refund_item.quantity,
            price: sale_item.price,
            total,
        });
    }

    Ok(RefundComputation {
        amount,
        items: lines,
    })
}

/// Assemble the API payload from database rows, rounding money at the
/// boundary and stripping the receipt binary.
fn build_sale(row: SaleRow, items: Vec<SaleItemRow>, refunded: Vec<RefundedItem>) -> AppResult<Sale> {
    let status = parse_status(&row.status)?;

    let receipt_photo = if row.has_receipt {
        Some(ReceiptInfo {
            content_type: row
                .receipt_content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            exists: true,
        })
    } else {
        None
    };

    Ok(Sale {
        id: row.id,
        sale_number: row.sale_number,
        store: StoreRef {
            id: row.store_id,
            name: row.store_name,
        },
        salesperson: UserRef {
            id: row.salesperson_id,
            name: row.salesperson,
        },
        salesperson_name: row.salesperson_name,
        customer_name: row.customer_name,
        items: items
            .into_iter()
            .map(|i| SaleItem {
                id: i.id,
                product_id: i.product_id,
                product_name: i.product_name,
                item_code: i.item_code,
                quantity: i.quantity,
                price: round_money(i.price),
                total: round_money(i.total),
            })
            .collect(),
        total_amount: round_money(row.total_amount),
        status,
        receipt_photo,
        cancel_reason: row.cancel_reason,
        cancelled_at: row.cancelled_at,
        cancelled_by: row.cancelled_by,
        refund_reason: row.refund_reason,
        refunded_at: row.refunded_at,
        refunded_by: row.refunded_by,
        refund_amount: row.refund_amount.map(round_money),
        refunded_items: refunded,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
