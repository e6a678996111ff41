//! Read-side order models.
//!
//! Orders are owned by the server; these views are what list, detail and
//! tracking screens render.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{checkout::PaymentMethod, orders::OrderStatus};

/// One line of a submitted order, as served back by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    /// Item display name.
    pub name: String,

    /// Units ordered.
    pub quantity: u32,

    /// Server-computed line price.
    pub price: Decimal,
}

/// Detail view of a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// Server-assigned order identifier.
    pub id: String,

    /// Restaurant the order was placed with.
    pub restaurant_name: String,

    /// Ordered lines.
    pub items: Vec<OrderItemView>,

    /// Server-computed order total.
    pub total: Decimal,

    /// Current lifecycle stage.
    pub status: OrderStatus,

    /// How the order is being paid for.
    pub payment_method: PaymentMethod,

    /// When the order was placed.
    pub created_at: Timestamp,
}
