//! Checkout errors.

use thiserror::Error;

use crate::http::ApiError;

/// Errors raised while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No delivery address is selected. Checked locally before any
    /// network call; the UI prompts for an address.
    #[error("no delivery address selected")]
    MissingAddress,

    /// The cart is empty. Checked locally before any network call.
    #[error("cart is empty")]
    EmptyCart,

    /// Order creation failed. The cart is untouched and the submission
    /// may simply be retried.
    #[error("order submission failed")]
    Submission(#[source] ApiError),

    /// The order was created but initiating its payment failed. The
    /// order stands and the cart stays cleared; retry the payment for
    /// `order_id` rather than re-submitting the cart.
    #[error("payment initiation failed for order {order_id}")]
    PaymentInitiation {
        /// The already-created order awaiting payment.
        order_id: String,

        /// What went wrong requesting the redirect.
        #[source]
        source: ApiError,
    },
}
