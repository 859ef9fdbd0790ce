//! Aggregation engine property-based and unit tests
//!
//! Covers the gap-filled daily series, trend percentages, averages over
//! calendar days, and store-scope narrowing.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::types::DateRange;
use shared::validation::round_money;

// ============================================================================
// Mirrored aggregation rules
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct DayFigures {
    date: NaiveDate,
    total_sales: u64,
    total_amount: Decimal,
}

/// One entry per calendar day of the range, zero-filled when absent.
fn fill_series(range: &DateRange, rows: &[DayFigures]) -> Vec<DayFigures> {
    let mut series = Vec::new();
    let mut date = range.start;
    while date <= range.end {
        let entry = rows
            .iter()
            .find(|r| r.date == date)
            .cloned()
            .unwrap_or(DayFigures {
                date,
                total_sales: 0,
                total_amount: Decimal::ZERO,
            });
        series.push(entry);
        date = date + chrono::Days::new(1);
    }
    series
}

/// Percent change from first to last; None on a zero baseline.
fn trend_percent(first: Decimal, last: Decimal) -> Option<Decimal> {
    if first.is_zero() {
        return None;
    }
    Some(round_money((last - first) / first * Decimal::from(100)))
}

/// Trends over the first and last day that have sales, None with < 2 such days.
fn series_trends(series: &[DayFigures]) -> (Option<Decimal>, Option<Decimal>) {
    let with_data: Vec<&DayFigures> = series.iter().filter(|d| d.total_sales > 0).collect();
    if with_data.len() < 2 {
        return (None, None);
    }
    let first = with_data[0];
    let last = with_data[with_data.len() - 1];
    (
        trend_percent(Decimal::from(first.total_sales), Decimal::from(last.total_sales)),
        trend_percent(first.total_amount, last.total_amount),
    )
}

/// Mean sale count over every calendar day of the range.
fn average_daily(range: &DateRange, total_sales: u64) -> Decimal {
    round_money(Decimal::from(total_sales) / Decimal::from(range.num_days().max(1)))
}

// ============================================================================
// Property Test Strategies
// ============================================================================

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0..=364u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(offset)
    })
}

fn range_strategy() -> impl Strategy<Value = DateRange> {
    (date_strategy(), 0..=30u64).prop_map(|(start, span)| {
        DateRange::new(start, start + chrono::Days::new(span))
    })
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0..=999999i64).prop_map(|n| Decimal::new(n, 2))
}

/// Generate sparse per-day figures inside a range
fn figures_strategy() -> impl Strategy<Value = (DateRange, Vec<DayFigures>)> {
    range_strategy().prop_flat_map(|range| {
        let days = range.num_days() as u64;
        prop::collection::vec((0..days, 1..=20u64, amount_strategy()), 0..=10).prop_map(
            move |entries| {
                let mut rows: Vec<DayFigures> = Vec::new();
                for (offset, sales, amount) in entries {
                    let date = range.start + chrono::Days::new(offset);
                    if !rows.iter().any(|r| r.date == date) {
                        rows.push(DayFigures {
                            date,
                            total_sales: sales,
                            total_amount: amount,
                        });
                    }
                }
                (range, rows)
            },
        )
    })
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// The series always has exactly one entry per calendar day, in order.
    #[test]
    fn test_series_covers_every_day((range, rows) in figures_strategy()) {
        let series = fill_series(&range, &rows);
        prop_assert_eq!(series.len() as i64, range.num_days());
        prop_assert_eq!(series.first().map(|d| d.date), Some(range.start));
        prop_assert_eq!(series.last().map(|d| d.date), Some(range.end));
        for window in series.windows(2) {
            prop_assert_eq!(window[1].date, window[0].date + chrono::Days::new(1));
        }
    }

    /// Gap-filling never invents sales: totals match the sparse input.
    #[test]
    fn test_series_preserves_totals((range, rows) in figures_strategy()) {
        let series = fill_series(&range, &rows);
        let series_sales: u64 = series.iter().map(|d| d.total_sales).sum();
        let input_sales: u64 = rows.iter().map(|d| d.total_sales).sum();
        prop_assert_eq!(series_sales, input_sales);

        let series_amount: Decimal = series.iter().map(|d| d.total_amount).sum();
        let input_amount: Decimal = rows.iter().map(|d| d.total_amount).sum();
        prop_assert_eq!(series_amount, input_amount);
    }

    /// Trends never divide by zero: any zero baseline reports None.
    #[test]
    fn test_trend_never_panics(first in amount_strategy(), last in amount_strategy()) {
        match trend_percent(first, last) {
            Some(_) => prop_assert!(!first.is_zero()),
            None => prop_assert!(first.is_zero()),
        }
    }

    /// Equal first and last values always trend to exactly zero.
    #[test]
    fn test_flat_trend_is_zero(value in amount_strategy()) {
        prop_assume!(!value.is_zero());
        prop_assert_eq!(trend_percent(value, value), Some(Decimal::ZERO.round_dp(2)));
    }

    /// The daily average never exceeds the total sale count.
    #[test]
    fn test_average_daily_bounded((range, rows) in figures_strategy()) {
        let total: u64 = rows.iter().map(|d| d.total_sales).sum();
        let average = average_daily(&range, total);
        prop_assert!(average >= Decimal::ZERO);
        prop_assert!(average <= Decimal::from(total) + Decimal::new(1, 2));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn day(d: NaiveDate, sales: u64, amount: &str) -> DayFigures {
        DayFigures {
            date: d,
            total_sales: sales,
            total_amount: dec(amount),
        }
    }

    #[test]
    fn test_week_with_one_active_day() {
        // 7-day range, sales only on day 3: 7 entries, 6 of them zero
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let rows = vec![day(date(2024, 3, 3), 4, "120.00")];

        let series = fill_series(&range, &rows);
        assert_eq!(series.len(), 7);
        assert_eq!(series.iter().filter(|d| d.total_sales == 0).count(), 6);
        assert_eq!(series[2].total_amount, dec("120.00"));
    }

    #[test]
    fn test_empty_range_summary_is_zeroed() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let series = fill_series(&range, &[]);
        assert!(series.iter().all(|d| d.total_sales == 0));
        assert_eq!(series_trends(&series), (None, None));
        assert_eq!(average_daily(&range, 0), Decimal::ZERO.round_dp(2));
    }

    #[test]
    fn test_trend_between_first_and_last_active_day() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 7));
        let rows = vec![
            day(date(2024, 3, 2), 2, "100.00"),
            day(date(2024, 3, 4), 9, "999.00"),
            day(date(2024, 3, 6), 3, "150.00"),
        ];

        let series = fill_series(&range, &rows);
        let (sales_trend, amount_trend) = series_trends(&series);
        // middle day is ignored; the trend compares day 2 against day 6
        assert_eq!(sales_trend, Some(dec("50.00")));
        assert_eq!(amount_trend, Some(dec("50.00")));
    }

    #[test]
    fn test_zero_count_baseline_yields_null_trend() {
        let series = vec![
            day(date(2024, 3, 1), 1, "0.00"),
            day(date(2024, 3, 2), 2, "80.00"),
        ];
        let (sales_trend, amount_trend) = series_trends(&series);
        assert_eq!(sales_trend, Some(dec("100.00")));
        assert_eq!(amount_trend, None);
    }

    #[test]
    fn test_single_active_day_has_no_trend() {
        let series = vec![day(date(2024, 3, 1), 5, "50.00")];
        assert_eq!(series_trends(&series), (None, None));
    }

    #[test]
    fn test_average_over_calendar_days_not_active_days() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 4));
        // 6 sales over 4 calendar days even though only 2 had sales
        assert_eq!(average_daily(&range, 6), dec("1.50"));
    }

    #[test]
    fn test_declining_trend_is_negative() {
        let series = vec![
            day(date(2024, 3, 1), 4, "200.00"),
            day(date(2024, 3, 2), 2, "150.00"),
        ];
        let (sales_trend, amount_trend) = series_trends(&series);
        assert_eq!(sales_trend, Some(dec("-50.00")));
        assert_eq!(amount_trend, Some(dec("-25.00")));
    }
}
