//! Sale ledger property-based and unit tests
//!
//! Covers the sale numbering scheme, server-side totals, the cancellation
//! window, and refund arithmetic.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

use shared::validation::{format_sale_number, parse_sale_number, round_money};

// ============================================================================
// Mirrored ledger rules
// ============================================================================

/// Line-item total and sale total, as the ledger computes them.
fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

fn sale_total(items: &[(Decimal, i32)]) -> Decimal {
    items.iter().map(|(p, q)| line_total(*p, *q)).sum()
}

/// Non-admin cancellation window rule.
fn cancellation_allowed(hours_since_creation: i64, is_admin: bool) -> bool {
    is_admin || hours_since_creation <= 24
}

/// Refund amount for a partial refund request against purchased items.
/// Returns None when a requested line is invalid.
fn partial_refund_amount(
    purchased: &[(Decimal, i32)],
    requested: &[(usize, i32)],
) -> Option<Decimal> {
    let mut amount = Decimal::ZERO;
    for (index, quantity) in requested {
        let (price, bought) = purchased.get(*index)?;
        if *quantity < 1 || quantity > bought {
            return None;
        }
        amount += line_total(*price, *quantity);
    }
    Some(amount)
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate prices as Decimals with 2 fractional digits (0.00 to 999.99)
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0..=99999i64).prop_map(|n| Decimal::new(n, 2))
}

/// Generate positive line quantities
fn quantity_strategy() -> impl Strategy<Value = i32> {
    1..=50i32
}

/// Generate a non-empty item list
fn items_strategy() -> impl Strategy<Value = Vec<(Decimal, i32)>> {
    prop::collection::vec((price_strategy(), quantity_strategy()), 1..=8)
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Sale numbers reconstruct their period and sequence exactly.
    #[test]
    fn test_sale_number_round_trip(
        year in 2020..=2099i32,
        month in 1..=12u32,
        seq in 1..=9999u32,
    ) {
        let number = format_sale_number(year, month, seq);
        prop_assert!(number.starts_with("SALE"));
        prop_assert_eq!(number.len(), 12);

        let parts = parse_sale_number(&number).expect("well-formed sale number");
        prop_assert_eq!(parts.year, (year % 100) as u32);
        prop_assert_eq!(parts.month, month);
        prop_assert_eq!(parts.sequence, seq);
    }

    /// Distinct sequences within one period yield distinct sale numbers.
    #[test]
    fn test_sale_numbers_unique_per_period(
        year in 2020..=2099i32,
        month in 1..=12u32,
        count in 2..=200u32,
    ) {
        let numbers: HashSet<String> = (1..=count)
            .map(|seq| format_sale_number(year, month, seq))
            .collect();
        prop_assert_eq!(numbers.len(), count as usize);
    }

    /// The sale total is the sum of line totals and never negative.
    #[test]
    fn test_sale_total_is_sum_of_lines(items in items_strategy()) {
        let total = sale_total(&items);
        let expected: Decimal = items
            .iter()
            .map(|(price, quantity)| *price * Decimal::from(*quantity))
            .sum();
        prop_assert_eq!(total, expected);
        prop_assert!(total >= Decimal::ZERO);
    }

    /// Adding a line never decreases the total.
    #[test]
    fn test_sale_total_monotonic(
        items in items_strategy(),
        extra_price in price_strategy(),
        extra_quantity in quantity_strategy(),
    ) {
        let base = sale_total(&items);
        let mut extended = items.clone();
        extended.push((extra_price, extra_quantity));
        prop_assert!(sale_total(&extended) >= base);
    }

    /// A full refund of every line equals the sale total.
    #[test]
    fn test_full_refund_equals_total(items in items_strategy()) {
        let requested: Vec<(usize, i32)> = items
            .iter()
            .enumerate()
            .map(|(index, (_, quantity))| (index, *quantity))
            .collect();
        let amount = partial_refund_amount(&items, &requested).expect("all lines valid");
        prop_assert_eq!(amount, sale_total(&items));
    }

    /// A partial refund never exceeds the sale total.
    #[test]
    fn test_partial_refund_bounded_by_total(
        items in items_strategy(),
        fractions in prop::collection::vec(0..=100i32, 8),
    ) {
        let requested: Vec<(usize, i32)> = items
            .iter()
            .enumerate()
            .zip(fractions)
            .filter_map(|((index, (_, quantity)), fraction)| {
                let take = quantity * fraction / 100;
                (take >= 1).then_some((index, take))
            })
            .collect();

        if let Some(amount) = partial_refund_amount(&items, &requested) {
            prop_assert!(amount <= sale_total(&items));
            prop_assert!(amount >= Decimal::ZERO);
        }
    }

    /// Over-refunding any line is rejected.
    #[test]
    fn test_refund_over_quantity_rejected(
        items in items_strategy(),
        excess in 1..=10i32,
    ) {
        let (_, bought) = items[0];
        let requested = [(0usize, bought + excess)];
        prop_assert_eq!(partial_refund_amount(&items, &requested), None);
    }

    /// Money rounding is idempotent and keeps at most 2 decimal places.
    #[test]
    fn test_round_money_idempotent(price in price_strategy()) {
        let rounded = round_money(price);
        prop_assert_eq!(round_money(rounded), rounded);
        prop_assert!(rounded.scale() <= 2);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_documented_total_example() {
        // 10.00 x 2 + 5.50 x 1 = 25.50
        let items = vec![(dec("10.00"), 2), (dec("5.50"), 1)];
        assert_eq!(sale_total(&items), dec("25.50"));
    }

    #[test]
    fn test_documented_partial_refund_example() {
        let items = vec![(dec("10.00"), 2), (dec("5.50"), 1)];
        let amount = partial_refund_amount(&items, &[(0, 1)]).unwrap();
        assert_eq!(amount, dec("10.00"));
    }

    #[test]
    fn test_sale_number_format() {
        assert_eq!(format_sale_number(2024, 3, 7), "SALE24030007");
        assert_eq!(format_sale_number(2025, 12, 9999), "SALE25129999");
    }

    #[test]
    fn test_malformed_sale_numbers_rejected() {
        assert!(parse_sale_number("SALE2403007").is_none());
        assert!(parse_sale_number("INV24030007").is_none());
        assert!(parse_sale_number("SALE24130007").is_none());
        assert!(parse_sale_number("").is_none());
    }

    #[test]
    fn test_cancellation_window_boundary() {
        assert!(cancellation_allowed(0, false));
        assert!(cancellation_allowed(24, false));
        assert!(!cancellation_allowed(25, false));
        assert!(cancellation_allowed(25, true));
        assert!(cancellation_allowed(24 * 365, true));
    }

    #[test]
    fn test_window_measured_from_creation() {
        let created = Utc::now() - Duration::hours(30);
        let elapsed = (Utc::now() - created).num_hours();
        assert!(!cancellation_allowed(elapsed, false));
    }

    #[test]
    fn test_refund_unknown_line_rejected() {
        let items = vec![(dec("10.00"), 2)];
        assert_eq!(partial_refund_amount(&items, &[(5, 1)]), None);
    }

    #[test]
    fn test_refund_zero_quantity_rejected() {
        let items = vec![(dec("10.00"), 2)];
        assert_eq!(partial_refund_amount(&items, &[(0, 0)]), None);
    }
}
