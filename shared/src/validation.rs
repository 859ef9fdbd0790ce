//! Pure validation and formatting helpers shared across the platform

use rust_decimal::Decimal;

/// Format a sale number from its components.
///
/// Sale numbers look like `SALE<YY><MM><seq>` where the sequence is a
/// 4-digit zero-padded counter scoped to the calendar month the sale was
/// created in, e.g. `SALE24030017`.
pub fn format_sale_number(year: i32, month: u32, sequence: u32) -> String {
    format!("SALE{:02}{:02}{:04}", year.rem_euclid(100), month, sequence)
}

/// Components of a parsed sale number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleNumberParts {
    pub year: u32,
    pub month: u32,
    pub sequence: u32,
}

/// Parse a sale number back into its components.
///
/// Returns `None` when the value does not match the `SALE<YY><MM><seq:4>`
/// shape or the month is out of range.
pub fn parse_sale_number(value: &str) -> Option<SaleNumberParts> {
    let digits = value.strip_prefix("SALE")?;
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let sequence: u32 = digits[4..8].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(SaleNumberParts {
        year,
        month,
        sequence,
    })
}

/// Validate a product item code: non-empty, at most 64 characters, ASCII
/// alphanumerics plus `-` and `_`.
pub fn is_valid_item_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 64
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Round a monetary amount to 2 decimal places for the response boundary.
/// Internal accumulation keeps full precision.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sale_number_format() {
        assert_eq!(format_sale_number(2024, 3, 17), "SALE24030017");
        assert_eq!(format_sale_number(2025, 12, 1), "SALE25120001");
    }

    #[test]
    fn test_sale_number_padding() {
        assert_eq!(format_sale_number(2024, 1, 9999), "SALE24019999");
        assert_eq!(format_sale_number(2024, 1, 1), "SALE24010001");
    }

    #[test]
    fn test_parse_sale_number() {
        let parts = parse_sale_number("SALE24030017").unwrap();
        assert_eq!(parts.year, 24);
        assert_eq!(parts.month, 3);
        assert_eq!(parts.sequence, 17);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_sale_number("SALE2403001").is_none()); // too short
        assert!(parse_sale_number("SALE240300170").is_none()); // too long
        assert!(parse_sale_number("SALE24130001").is_none()); // month 13
        assert!(parse_sale_number("INV24030001").is_none());
        assert!(parse_sale_number("SALE2403ABCD").is_none());
    }

    #[test]
    fn test_item_code_validation() {
        assert!(is_valid_item_code("SKU-1001"));
        assert!(is_valid_item_code("ab_99"));
        assert!(!is_valid_item_code(""));
        assert!(!is_valid_item_code("has space"));
        assert!(!is_valid_item_code(&"x".repeat(65)));
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(10004, 3)), Decimal::new(1000, 2));
        assert_eq!(round_money(Decimal::new(10006, 3)), Decimal::new(1001, 2));
        assert_eq!(round_money(Decimal::new(2550, 2)), Decimal::new(2550, 2));
    }

    proptest! {
        /// Formatting then parsing a sale number recovers the components.
        #[test]
        fn prop_sale_number_round_trip(
            year in 2000..2100i32,
            month in 1..=12u32,
            seq in 1..=9999u32,
        ) {
            let formatted = format_sale_number(year, month, seq);
            let parts = parse_sale_number(&formatted).unwrap();
            prop_assert_eq!(parts.year, (year % 100) as u32);
            prop_assert_eq!(parts.month, month);
            prop_assert_eq!(parts.sequence, seq);
        }

        /// Distinct (month, sequence) pairs always produce distinct numbers.
        #[test]
        fn prop_sale_numbers_unique_within_year(
            a in (1..=12u32, 1..=9999u32),
            b in (1..=12u32, 1..=9999u32),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                format_sale_number(2024, a.0, a.1),
                format_sale_number(2024, b.0, b.1)
            );
        }
    }
}
