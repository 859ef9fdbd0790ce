//! Sales aggregation service
//!
//! Read-only rollups over completed sales: period summaries, gap-filled
//! daily series, and product/salesperson breakdowns. Cancelled and refunded
//! sales never contribute to any figure here.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{AuthUser, StoreScope};
use shared::types::DateRange;
use shared::validation::round_money;

/// How many top-selling products a stats summary carries.
const TOP_PRODUCTS_LIMIT: i64 = 5;

/// Sales aggregation service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Query parameters shared by the date-range aggregation endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct ReportQuery {
    pub store: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for the monthly rollup: a calendar month, not a free
/// date range.
#[derive(Debug, Default, serde::Deserialize)]
pub struct MonthlyQuery {
    pub store: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Period totals: sale count, revenue, mean ticket
#[derive(Debug, Serialize)]
pub struct PeriodSummary {
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub unique_customers: u64,
}

/// Headline figures plus breakdowns for a period
#[derive(Debug, Serialize)]
pub struct SalesStats {
    pub summary: PeriodSummary,
    pub department_breakdown: Vec<GroupBreakdown>,
    pub category_breakdown: Vec<GroupBreakdown>,
    pub top_products: Vec<ProductBreakdown>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Line-item totals grouped by a catalog attribute
#[derive(Debug, Serialize)]
pub struct GroupBreakdown {
    pub name: String,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ProductBreakdown {
    pub product_id: Uuid,
    pub product_name: String,
    pub item_code: String,
    pub total_quantity: i64,
    pub total_amount: Decimal,
    pub sales_count: u64,
    pub average_amount: Decimal,
}

/// One calendar day of the daily series. Days without sales are present
/// with zeroed figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub total_items: u64,
}

/// Daily series with period totals and first-to-last trends
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub days: Vec<DailyPoint>,
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub total_items: u64,
    /// Mean sale count per calendar day of the range, empty days included.
    pub average_daily_sales: Decimal,
    /// Percent change of the sale count between the first and last day with
    /// data; null when fewer than two such days exist or the first is zero.
    pub sales_trend: Option<Decimal>,
    pub amount_trend: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Month rollup grouped by catalog placement
#[derive(Debug, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub summary: MonthlyTotals,
    pub sales_by_category: Vec<CategoryGroup>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyTotals {
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub total_items: u64,
}

/// Totals for one (department, category, subcategory) placement
#[derive(Debug, Serialize)]
pub struct CategoryGroup {
    pub department: String,
    pub category: String,
    pub subcategory: String,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SalespersonBreakdown {
    pub salesperson_id: Uuid,
    pub salesperson_name: String,
    pub store_name: String,
    pub total_sales: u64,
    pub total_amount: Decimal,
    pub total_items: u64,
    pub average_amount: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct DailyRow {
    day: NaiveDate,
    total_sales: i64,
    total_amount: Decimal,
    total_items: i64,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Headline stats for a period, defaulting to today.
    pub async fn stats(&self, actor: &AuthUser, query: ReportQuery) -> AppResult<SalesStats> {
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let range = resolve_range(query.start_date, query.end_date, default_today)?;

        let summary = self.period_summary(&scope, &range).await?;
        let department_breakdown = self.group_breakdown(&scope, &range, "department").await?;
        let category_breakdown = self.group_breakdown(&scope, &range, "category").await?;
        let top_products = self
            .product_breakdown(&scope, &range, ProductOrder::Quantity, Some(TOP_PRODUCTS_LIMIT))
            .await?;

        Ok(SalesStats {
            summary,
            department_breakdown,
            category_breakdown,
            top_products,
            start_date: range.start,
            end_date: range.end,
        })
    }

    /// Gap-filled daily series, defaulting to the last 7 days.
    pub async fn daily(&self, actor: &AuthUser, query: ReportQuery) -> AppResult<DailySummary> {
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let range = resolve_range(query.start_date, query.end_date, default_last_week)?;

        let rows = self.daily_rows(&scope, &range).await?;
        Ok(build_daily_summary(&range, &rows))
    }

    /// Rollup of the current (or requested) calendar month, grouped by the
    /// product's catalog placement.
    pub async fn monthly(&self, actor: &AuthUser, query: MonthlyQuery) -> AppResult<MonthlySummary> {
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let range = resolve_month(query.year, query.month, Utc::now())?;

        let summary = self.period_summary(&scope, &range).await?;
        let item_total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            "#,
        )
        .bind(scope.as_filter())
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_one(&self.db)
        .await?;

        let groups = sqlx::query_as::<_, (String, String, String, i64, Decimal)>(
            r#"
            SELECT COALESCE(p.department, 'uncategorized'),
                   COALESCE(p.category, 'uncategorized'),
                   COALESCE(p.subcategory, 'uncategorized'),
                   COALESCE(SUM(si.quantity), 0) AS total_quantity,
                   COALESCE(SUM(si.total), 0) AS total_amount
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY 1, 2, 3
            ORDER BY total_amount DESC
            "#,
        )
        .bind(scope.as_filter())
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_all(&self.db)
        .await?;

        Ok(MonthlySummary {
            year: range.start.year(),
            month: range.start.month(),
            summary: MonthlyTotals {
                total_sales: summary.total_sales,
                total_amount: summary.total_amount,
                average_amount: summary.average_amount,
                total_items: item_total as u64,
            },
            sales_by_category: groups
                .into_iter()
                .map(
                    |(department, category, subcategory, total_quantity, total_amount)| {
                        CategoryGroup {
                            department,
                            category,
                            subcategory,
                            total_quantity,
                            total_amount: round_money(total_amount),
                        }
                    },
                )
                .collect(),
        })
    }

    /// Per-product figures for a period, revenue-ordered.
    pub async fn by_product(
        &self,
        actor: &AuthUser,
        query: ReportQuery,
    ) -> AppResult<Vec<ProductBreakdown>> {
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let range = resolve_range(query.start_date, query.end_date, default_last_week)?;
        self.product_breakdown(&scope, &range, ProductOrder::Amount, None)
            .await
    }

    /// Per-salesperson figures, admin only, revenue-ordered.
    pub async fn by_salesperson(
        &self,
        actor: &AuthUser,
        query: ReportQuery,
    ) -> AppResult<Vec<SalespersonBreakdown>> {
        actor.require_admin()?;
        let scope = actor.resolve_store_scope(query.store.as_deref())?;
        let range = resolve_range(query.start_date, query.end_date, default_last_week)?;

        let rows = sqlx::query_as::<_, (Uuid, String, String, i64, Decimal, i64)>(
            r#"
            SELECT s.salesperson_id, u.name, st.name AS store_name,
                   COUNT(*) AS total_sales,
                   COALESCE(SUM(s.total_amount), 0) AS total_amount,
                   COALESCE(SUM(ic.item_count), 0) AS total_items
            FROM sales s
            JOIN users u ON u.id = s.salesperson_id
            JOIN stores st ON st.id = s.store_id
            LEFT JOIN (
                SELECT sale_id, COUNT(*) AS item_count
                FROM sale_items GROUP BY sale_id
            ) ic ON ic.sale_id = s.id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY s.salesperson_id, u.name, st.name
            ORDER BY total_amount DESC
            "#,
        )
        .bind(scope.as_filter())
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(salesperson_id, salesperson_name, store_name, count, amount, items)| {
                    SalespersonBreakdown {
                        salesperson_id,
                        salesperson_name,
                        store_name,
                        total_sales: count as u64,
                        total_amount: round_money(amount),
                        total_items: items as u64,
                        average_amount: safe_average(amount, count),
                    }
                },
            )
            .collect())
    }

    async fn period_summary(
        &self,
        scope: &StoreScope,
        range: &DateRange,
    ) -> AppResult<PeriodSummary> {
        let row = sqlx::query_as::<_, (i64, Decimal, Decimal, i64)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_amount), 0),
                   COALESCE(AVG(total_amount), 0),
                   COUNT(DISTINCT customer_name)
            FROM sales
            WHERE status = 'completed'
              AND ($1::uuid IS NULL OR store_id = $1)
              AND created_at >= $2 AND created_at < $3
            "#,
        )
        .bind(scope.as_filter())
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_one(&self.db)
        .await?;

        Ok(PeriodSummary {
            total_sales: row.0 as u64,
            total_amount: round_money(row.1),
            average_amount: round_money(row.2),
            unique_customers: row.3 as u64,
        })
    }

    async fn group_breakdown(
        &self,
        scope: &StoreScope,
        range: &DateRange,
        attribute: &str,
    ) -> AppResult<Vec<GroupBreakdown>> {
        // attribute is a fixed column name chosen by the caller, never input
        let sql = format!(
            r#"
            SELECT COALESCE(p.{attr}, 'uncategorized') AS name,
                   COALESCE(SUM(si.quantity), 0) AS total_quantity,
                   COALESCE(SUM(si.total), 0) AS total_amount
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY COALESCE(p.{attr}, 'uncategorized')
            ORDER BY total_amount DESC
            "#,
            attr = attribute
        );

        let rows = sqlx::query_as::<_, (String, i64, Decimal)>(&sql)
            .bind(scope.as_filter())
            .bind(range.start_bound())
            .bind(range.end_bound())
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, total_quantity, total_amount)| GroupBreakdown {
                name,
                total_quantity,
                total_amount: round_money(total_amount),
            })
            .collect())
    }

    async fn product_breakdown(
        &self,
        scope: &StoreScope,
        range: &DateRange,
        order: ProductOrder,
        limit: Option<i64>,
    ) -> AppResult<Vec<ProductBreakdown>> {
        let order_clause = match order {
            ProductOrder::Quantity => "total_quantity DESC",
            ProductOrder::Amount => "total_amount DESC",
        };
        let sql = format!(
            r#"
            SELECT si.product_id, p.name, p.item_code,
                   COALESCE(SUM(si.quantity), 0) AS total_quantity,
                   COALESCE(SUM(si.total), 0) AS total_amount,
                   COUNT(DISTINCT s.id) AS sales_count
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY si.product_id, p.name, p.item_code
            ORDER BY {}
            LIMIT $4
            "#,
            order_clause
        );

        let rows = sqlx::query_as::<_, (Uuid, String, String, i64, Decimal, i64)>(&sql)
            .bind(scope.as_filter())
            .bind(range.start_bound())
            .bind(range.end_bound())
            .bind(limit)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(product_id, product_name, item_code, total_quantity, total_amount, count)| {
                    ProductBreakdown {
                        product_id,
                        product_name,
                        item_code,
                        total_quantity,
                        total_amount: round_money(total_amount),
                        sales_count: count as u64,
                        average_amount: safe_average(total_amount, count),
                    }
                },
            )
            .collect())
    }

    async fn daily_rows(&self, scope: &StoreScope, range: &DateRange) -> AppResult<Vec<DailyRow>> {
        // total_items counts line items, not quantity units
        let rows = sqlx::query_as::<_, DailyRow>(
            r#"
            SELECT (s.created_at AT TIME ZONE 'UTC')::date AS day,
                   COUNT(*) AS total_sales,
                   COALESCE(SUM(s.total_amount), 0) AS total_amount,
                   COALESCE(SUM(ic.item_count), 0) AS total_items
            FROM sales s
            LEFT JOIN (
                SELECT sale_id, COUNT(*) AS item_count
                FROM sale_items GROUP BY sale_id
            ) ic ON ic.sale_id = s.id
            WHERE s.status = 'completed'
              AND ($1::uuid IS NULL OR s.store_id = $1)
              AND s.created_at >= $2 AND s.created_at < $3
            GROUP BY (s.created_at AT TIME ZONE 'UTC')::date
            ORDER BY day
            "#,
        )
        .bind(scope.as_filter())
        .bind(range.start_bound())
        .bind(range.end_bound())
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

enum ProductOrder {
    Quantity,
    Amount,
}

/// Resolve explicit date parameters against a default period. Both bounds
/// must be given together; a start after the end is rejected.
fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default: fn(DateTime<Utc>) -> DateRange,
) -> AppResult<DateRange> {
    match (start, end) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::ValidationError(
                    "start_date must not be after end_date".to_string(),
                ));
            }
            Ok(DateRange::new(start, end))
        }
        (None, None) => Ok(default(Utc::now())),
        _ => Err(AppError::ValidationError(
            "start_date and end_date must be provided together".to_string(),
        )),
    }
}

/// Resolve explicit year/month parameters to that whole calendar month;
/// with neither given the current month to date is used. A lone year or
/// month is rejected.
fn resolve_month(
    year: Option<i32>,
    month: Option<u32>,
    now: DateTime<Utc>,
) -> AppResult<DateRange> {
    match (year, month) {
        (Some(year), Some(month)) => {
            let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                AppError::ValidationError(format!("Invalid month: {}-{}", year, month))
            })?;
            let next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            }
            .ok_or_else(|| {
                AppError::ValidationError(format!("Invalid month: {}-{}", year, month))
            })?;
            Ok(DateRange::new(first, next - chrono::Days::new(1)))
        }
        (None, None) => Ok(default_current_month(now)),
        _ => Err(AppError::ValidationError(
            "year and month must be provided together".to_string(),
        )),
    }
}

fn default_today(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    DateRange::new(today, today)
}

fn default_last_week(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    DateRange::new(today - chrono::Days::new(6), today)
}

fn default_current_month(now: DateTime<Utc>) -> DateRange {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    DateRange::new(first, today)
}

fn safe_average(amount: Decimal, count: i64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        round_money(amount / Decimal::from(count))
    }
}

/// Expand sparse per-day rows into one point per calendar day of the range,
/// zero-filling days without sales.
fn fill_daily_series(range: &DateRange, rows: &[DailyRow]) -> Vec<DailyPoint> {
    let mut days = Vec::with_capacity(range.num_days().max(0) as usize);
    let mut date = range.start;
    while date <= range.end {
        let point = rows
            .iter()
            .find(|r| r.day == date)
            .map(|r| DailyPoint {
                date,
                total_sales: r.total_sales as u64,
                total_amount: round_money(r.total_amount),
                average_amount: safe_average(r.total_amount, r.total_sales),
                total_items: r.total_items as u64,
            })
            .unwrap_or(DailyPoint {
                date,
                total_sales: 0,
                total_amount: Decimal::ZERO,
                average_amount: Decimal::ZERO,
                total_items: 0,
            });
        days.push(point);
        date = date + chrono::Days::new(1);
    }
    days
}

/// Percent change from `first` to `last`; None when `first` is zero.
fn trend_percent(first: Decimal, last: Decimal) -> Option<Decimal> {
    if first.is_zero() {
        return None;
    }
    Some(round_money((last - first) / first * Decimal::from(100)))
}

/// Assemble the daily summary: totals over the gap-filled series, the mean
/// sale count over every calendar day of the range, and trends between the
/// first and last day that actually have sales.
fn build_daily_summary(range: &DateRange, rows: &[DailyRow]) -> DailySummary {
    let days = fill_daily_series(range, rows);

    let total_sales: u64 = days.iter().map(|d| d.total_sales).sum();
    let total_amount: Decimal = days.iter().map(|d| d.total_amount).sum();
    let total_items: u64 = days.iter().map(|d| d.total_items).sum();

    let day_count = range.num_days().max(1);
    let average_daily_sales = round_money(Decimal::from(total_sales) / Decimal::from(day_count));

    let with_data: Vec<&DailyPoint> = days.iter().filter(|d| d.total_sales > 0).collect();
    let (sales_trend, amount_trend) = if with_data.len() < 2 {
        (None, None)
    } else {
        let first = with_data[0];
        let last = with_data[with_data.len() - 1];
        (
            trend_percent(Decimal::from(first.total_sales), Decimal::from(last.total_sales)),
            trend_percent(first.total_amount, last.total_amount),
        )
    };

    DailySummary {
        days,
        total_sales,
        total_amount: round_money(total_amount),
        total_items,
        average_daily_sales,
        sales_trend,
        amount_trend,
        start_date: range.start,
        end_date: range.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(day: NaiveDate, sales: i64, amount: &str, items: i64) -> DailyRow {
        DailyRow {
            day,
            total_sales: sales,
            total_amount: amount.parse().unwrap(),
            total_items: items,
        }
    }

    #[test]
    fn test_fill_daily_series_zero_fills_gaps() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 5));
        let rows = vec![
            row(date(2024, 3, 2), 4, "100.00", 7),
            row(date(2024, 3, 4), 1, "50.00", 2),
        ];

        let days = fill_daily_series(&range, &rows);
        assert_eq!(days.len(), 5);
        assert_eq!(days[0].total_sales, 0);
        assert_eq!(days[0].total_amount, Decimal::ZERO);
        assert_eq!(days[1].total_sales, 4);
        assert_eq!(days[1].average_amount, "25.00".parse::<Decimal>().unwrap());
        assert_eq!(days[2].total_sales, 0);
        assert_eq!(days[3].total_amount, "50.00".parse::<Decimal>().unwrap());
        assert_eq!(days[4].total_sales, 0);
    }

    #[test]
    fn test_week_with_sales_on_one_day_has_six_empty_entries() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let rows = vec![row(date(2024, 3, 3), 2, "40.00", 3)];

        let days = fill_daily_series(&range, &rows);
        assert_eq!(days.len(), 7);
        assert_eq!(days.iter().filter(|d| d.total_sales == 0).count(), 6);
    }

    #[test]
    fn test_trend_percent_basic() {
        let first = "100".parse().unwrap();
        let last = "150".parse().unwrap();
        assert_eq!(trend_percent(first, last), Some("50.00".parse().unwrap()));
    }

    #[test]
    fn test_trend_percent_decline() {
        let first = "200".parse().unwrap();
        let last = "150".parse().unwrap();
        assert_eq!(trend_percent(first, last), Some("-25.00".parse().unwrap()));
    }

    #[test]
    fn test_trend_percent_zero_baseline_is_none() {
        assert_eq!(trend_percent(Decimal::ZERO, "10".parse().unwrap()), None);
    }

    #[test]
    fn test_daily_summary_totals_and_average() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 4));
        let rows = vec![
            row(date(2024, 3, 1), 2, "100.00", 3),
            row(date(2024, 3, 3), 3, "60.00", 5),
        ];

        let summary = build_daily_summary(&range, &rows);
        assert_eq!(summary.total_sales, 5);
        assert_eq!(summary.total_amount, "160.00".parse::<Decimal>().unwrap());
        assert_eq!(summary.total_items, 8);
        // 5 sales over 4 calendar days, including empty ones
        assert_eq!(
            summary.average_daily_sales,
            "1.25".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_daily_summary_trends_skip_empty_days() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let rows = vec![
            row(date(2024, 3, 2), 2, "100.00", 3),
            row(date(2024, 3, 6), 3, "150.00", 4),
        ];

        let summary = build_daily_summary(&range, &rows);
        assert_eq!(summary.sales_trend, Some("50.00".parse().unwrap()));
        assert_eq!(summary.amount_trend, Some("50.00".parse().unwrap()));
    }

    #[test]
    fn test_daily_summary_single_data_day_has_no_trend() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let rows = vec![row(date(2024, 3, 2), 2, "100.00", 3)];

        let summary = build_daily_summary(&range, &rows);
        assert_eq!(summary.sales_trend, None);
        assert_eq!(summary.amount_trend, None);
    }

    #[test]
    fn test_daily_summary_zero_amount_baseline_trend_is_none() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 3));
        let rows = vec![
            row(date(2024, 3, 1), 1, "0.00", 1),
            row(date(2024, 3, 3), 2, "80.00", 2),
        ];

        let summary = build_daily_summary(&range, &rows);
        assert_eq!(summary.amount_trend, None);
        // the sale-count baseline is nonzero, so that trend still computes
        assert_eq!(summary.sales_trend, Some("100.00".parse().unwrap()));
    }

    #[test]
    fn test_resolve_range_rejects_inverted_bounds() {
        let result = resolve_range(Some(date(2024, 3, 5)), Some(date(2024, 3, 1)), default_today);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_resolve_range_requires_both_bounds() {
        let result = resolve_range(Some(date(2024, 3, 5)), None, default_today);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_default_last_week_is_seven_days() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = default_last_week(now);
        assert_eq!(range.num_days(), 7);
        assert_eq!(range.end, date(2024, 3, 10));
        assert_eq!(range.start, date(2024, 3, 4));
    }

    #[test]
    fn test_default_today_is_single_day() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = default_today(now);
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_default_current_month_starts_on_first() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = default_current_month(now);
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 10));
    }

    #[test]
    fn test_resolve_month_explicit_covers_whole_month() {
        let now = date(2024, 6, 15).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = resolve_month(Some(2024), Some(2), now).unwrap();
        // 2024 is a leap year
        assert_eq!(range.start, date(2024, 2, 1));
        assert_eq!(range.end, date(2024, 2, 29));
    }

    #[test]
    fn test_resolve_month_december_wraps_year() {
        let now = date(2024, 6, 15).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = resolve_month(Some(2023), Some(12), now).unwrap();
        assert_eq!(range.start, date(2023, 12, 1));
        assert_eq!(range.end, date(2023, 12, 31));
    }

    #[test]
    fn test_resolve_month_defaults_to_current_month_to_date() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        let range = resolve_month(None, None, now).unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 10));
    }

    #[test]
    fn test_resolve_month_rejects_lone_parameter() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        assert!(matches!(
            resolve_month(Some(2024), None, now),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            resolve_month(None, Some(3), now),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_resolve_month_rejects_out_of_range_month() {
        let now = date(2024, 3, 10).and_time(chrono::NaiveTime::MIN).and_utc();
        assert!(matches!(
            resolve_month(Some(2024), Some(13), now),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            resolve_month(Some(2024), Some(0), now),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_safe_average_empty_is_zero() {
        assert_eq!(safe_average("10.00".parse().unwrap(), 0), Decimal::ZERO);
        assert_eq!(
            safe_average("10.00".parse().unwrap(), 4),
            "2.50".parse::<Decimal>().unwrap()
        );
    }
}
