//! Monetary amounts.
//!
//! Every monetary field in the engine is a [`rust_decimal::Decimal`];
//! floats never touch prices.

use rust_decimal::Decimal;

/// Clamp a computed amount at zero.
///
/// A discount larger than the subtotal plus fees would otherwise drive
/// the cart total negative; totals floor at zero instead.
#[must_use]
pub fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
