//! Checkout orchestration.
//!
//! Turns the current cart, a selected address and a payment method into
//! a submitted order. The cart is cleared the moment order creation
//! succeeds, before any payment-specific step, so a created order is
//! never silently lost: a later payment failure routes to a retry view
//! for the same order id instead of resurrecting the cart.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    cart::CartEngine,
    checkout::{
        CheckoutError, CheckoutRequest, OrderDraft, OrderDraftItem, OrdersGateway,
        PaymentMethod, PaymentRedirect, PaymentsGateway,
    },
};

/// Where a successful checkout leaves the user.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Order placed; payment is due to the courier. The confirmation
    /// view shows the server-computed total.
    CashOnDelivery {
        /// Server-assigned order identifier.
        order_id: String,

        /// Server-computed final total.
        total: Decimal,
    },

    /// Order placed; the user is handed to the payment gateway.
    OnlinePayment {
        /// Server-assigned order identifier.
        order_id: String,

        /// Gateway URL to redirect to.
        redirect_url: String,
    },
}

/// Validates preconditions, submits the order and branches into the
/// chosen payment path.
pub struct CheckoutOrchestrator {
    cart: Arc<CartEngine>,
    orders: Arc<dyn OrdersGateway>,
    payments: Arc<dyn PaymentsGateway>,
}

impl fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutOrchestrator").finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    /// Create an orchestrator over the cart engine and the two gateways.
    #[must_use]
    pub fn new(
        cart: Arc<CartEngine>,
        orders: Arc<dyn OrdersGateway>,
        payments: Arc<dyn PaymentsGateway>,
    ) -> Self {
        Self {
            cart,
            orders,
            payments,
        }
    }

    /// Place an order from the current cart.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::MissingAddress`] and [`CheckoutError::EmptyCart`]
    /// block the submission before any network call.
    /// [`CheckoutError::Submission`] means order creation failed and the
    /// cart is untouched. [`CheckoutError::PaymentInitiation`] means the
    /// order exists but the payment redirect could not be obtained; the
    /// cart stays cleared and the caller routes to a retry view.
    #[tracing::instrument(
        name = "checkout.place_order",
        skip_all,
        fields(payment = ?request.payment_method)
    )]
    pub async fn place_order(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let address = request.address.ok_or(CheckoutError::MissingAddress)?;

        let snapshot = self.cart.snapshot().await;

        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // A non-empty cart is always bound to a restaurant.
        let Some(restaurant_id) = snapshot.restaurant_id.clone() else {
            return Err(CheckoutError::EmptyCart);
        };

        let items = snapshot
            .items
            .iter()
            .map(|line| OrderDraftItem {
                menu_item_id: line.menu_item_id.clone(),
                quantity: line.quantity,
                options: line.options.clone(),
            })
            .collect();

        let draft = OrderDraft {
            restaurant_id,
            items,
            delivery_address: address,
            payment_method: request.payment_method,
            notes: request.notes,
            scheduled_for: request.scheduled_for,
        };

        let created = self
            .orders
            .create_order(draft)
            .await
            .map_err(CheckoutError::Submission)?;

        info!(order_id = %created.id, total = %created.total, "order created");

        // The order now exists server-side; the cart must not outlive it,
        // or an aborted payment would re-submit a second order.
        self.cart.clear().await;

        match request.payment_method {
            PaymentMethod::CashOnDelivery => Ok(CheckoutOutcome::CashOnDelivery {
                order_id: created.id,
                total: created.total,
            }),
            PaymentMethod::OnlineGateway => {
                match self.payments.create_payment_url(&created.id).await {
                    Ok(redirect) => Ok(CheckoutOutcome::OnlinePayment {
                        order_id: redirect.order_id,
                        redirect_url: redirect.redirect_url,
                    }),
                    Err(source) => {
                        warn!(order_id = %created.id, %source, "payment initiation failed");

                        Err(CheckoutError::PaymentInitiation {
                            order_id: created.id,
                            source,
                        })
                    }
                }
            }
        }
    }

    /// Re-request the payment redirect for an already-created order.
    ///
    /// This is the recovery path after a failed or aborted payment: the
    /// same order id re-enters the payment flow, and no cart is ever
    /// re-submitted.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::PaymentInitiation`] when the gateway call
    /// fails.
    #[tracing::instrument(name = "checkout.retry_payment", skip(self))]
    pub async fn retry_payment(&self, order_id: &str) -> Result<PaymentRedirect, CheckoutError> {
        self.payments
            .create_payment_url(order_id)
            .await
            .map_err(|source| CheckoutError::PaymentInitiation {
                order_id: order_id.to_owned(),
                source,
            })
    }
}
