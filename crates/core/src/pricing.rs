//! Cart pricing.
//!
//! All arithmetic is exact decimal; nothing is rounded until display.

use rust_decimal::Decimal;

use crate::types::CartItem;

/// Price of a single line: `unit_price × quantity`.
#[must_use]
pub fn line_total(item: &CartItem) -> Decimal {
    item.unit_price * Decimal::from(item.quantity)
}

/// Sum of all line totals. Zero for an empty slice.
///
/// ```
/// use bookshop_core::{CartItem, pricing::compute_total};
/// use rust_decimal::Decimal;
///
/// let items = [
///     CartItem::new("a", 3, Decimal::new(250, 2)),
///     CartItem::new("b", 1, Decimal::new(100, 2)),
/// ];
/// assert_eq!(compute_total(&items), Decimal::new(850, 2));
/// ```
#[must_use]
pub fn compute_total(items: &[CartItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_total_is_exact() {
        let items = [
            CartItem::new("a", 3, Decimal::new(250, 2)),
            CartItem::new("b", 1, Decimal::new(100, 2)),
        ];
        assert_eq!(compute_total(&items), Decimal::new(850, 2));
    }

    #[test]
    fn test_duplicate_lines_both_count() {
        let items = [
            CartItem::new("a", 2, Decimal::new(5, 0)),
            CartItem::new("a", 2, Decimal::new(5, 0)),
        ];
        assert_eq!(compute_total(&items), Decimal::new(20, 0));
    }

    #[test]
    fn test_zero_quantity_contributes_nothing() {
        let items = [
            CartItem::new("a", 0, Decimal::new(999, 2)),
            CartItem::new("b", 4, Decimal::new(10, 1)),
        ];
        assert_eq!(compute_total(&items), Decimal::new(4, 0));
    }

    #[test]
    fn test_tenths_do_not_drift() {
        let items: Vec<_> = (0..10)
            .map(|i| CartItem::new(format!("p{i}"), 1, Decimal::new(1, 1)))
            .collect();
        assert_eq!(compute_total(&items), Decimal::ONE);
    }
}
