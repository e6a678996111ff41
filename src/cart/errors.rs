//! Cart engine errors.

use thiserror::Error;

/// Errors raised by cart mutations.
///
/// A failed mutation never partially applies; the cart is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart is bound to another restaurant (current, attempted).
    /// Callers confirm the replacement and clear the cart first.
    #[error("cart belongs to {0}; clear it before ordering from {1}")]
    DifferentRestaurant(String, String),

    /// No line item exists at the given index.
    #[error("item {0} not found")]
    ItemNotFound(usize),
}
