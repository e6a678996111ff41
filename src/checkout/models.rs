//! Checkout models and wire payloads.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::OptionSelection, orders::OrderStatus};

/// A payment method code outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown payment method code {0}")]
pub struct UnknownPaymentCode(pub u8);

/// How an order is paid for. Wire-encoded as integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PaymentMethod {
    /// Pay the courier in cash on delivery.
    CashOnDelivery = 0,

    /// Pay up front through the online gateway's redirect flow.
    OnlineGateway = 1,
}

impl From<PaymentMethod> for u8 {
    fn from(method: PaymentMethod) -> Self {
        method as Self
    }
}

impl TryFrom<u8> for PaymentMethod {
    type Error = UnknownPaymentCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::CashOnDelivery),
            1 => Ok(Self::OnlineGateway),
            other => Err(UnknownPaymentCode(other)),
        }
    }
}

/// A delivery destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    /// Human-readable address line.
    pub address: String,

    /// Latitude.
    pub lat: f64,

    /// Longitude.
    pub lng: f64,
}

/// What the caller supplies to place an order, alongside the cart.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Selected delivery address; checkout refuses to run without one.
    pub address: Option<DeliveryAddress>,

    /// Chosen payment path.
    pub payment_method: PaymentMethod,

    /// Free-form notes to the restaurant or courier.
    pub notes: Option<String>,

    /// Requested delivery time for scheduled orders.
    pub scheduled_for: Option<Timestamp>,
}

/// One line of the order payload: menu item, quantity and the option
/// snapshot. Prices are never sent; the server is the source of truth
/// for final pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraftItem {
    /// Menu item to order.
    pub menu_item_id: String,

    /// Units ordered.
    pub quantity: u32,

    /// Chosen modifiers, as snapshotted in the cart.
    pub options: Vec<OptionSelection>,
}

/// The payload submitted to order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Restaurant the cart is bound to.
    pub restaurant_id: String,

    /// Ordered lines, reduced to identity, quantity and options.
    pub items: Vec<OrderDraftItem>,

    /// Where to deliver.
    pub delivery_address: DeliveryAddress,

    /// Chosen payment path.
    pub payment_method: PaymentMethod,

    /// Free-form notes, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Requested delivery time, omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<Timestamp>,
}

/// Server acknowledgement of a created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    /// Server-assigned order identifier.
    pub id: String,

    /// Server-computed final total.
    pub total: Decimal,

    /// Initial lifecycle stage, normally [`OrderStatus::Pending`].
    pub status: OrderStatus,
}

/// The payment-initiation artifact for the online path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirect {
    /// Order the payment settles.
    pub order_id: String,

    /// Gateway URL the user is handed to.
    pub redirect_url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payment_methods_use_integer_wire_codes() {
        assert_eq!(u8::from(PaymentMethod::CashOnDelivery), 0);
        assert_eq!(u8::from(PaymentMethod::OnlineGateway), 1);
        assert_eq!(PaymentMethod::try_from(2), Err(UnknownPaymentCode(2)));
    }

    #[test]
    fn draft_omits_absent_optionals_and_all_prices() {
        let draft = OrderDraft {
            restaurant_id: "r-1".to_owned(),
            items: vec![OrderDraftItem {
                menu_item_id: "m-1".to_owned(),
                quantity: 2,
                options: Vec::new(),
            }],
            delivery_address: DeliveryAddress {
                address: "12 Hang Bac".to_owned(),
                lat: 21.03,
                lng: 105.85,
            },
            payment_method: PaymentMethod::CashOnDelivery,
            notes: None,
            scheduled_for: None,
        };

        let encoded = serde_json::to_value(&draft).unwrap_or_default();

        assert_eq!(
            encoded,
            json!({
                "restaurantId": "r-1",
                "items": [{ "menuItemId": "m-1", "quantity": 2, "options": [] }],
                "deliveryAddress": { "address": "12 Hang Bac", "lat": 21.03, "lng": 105.85 },
                "paymentMethod": 0,
            })
        );
    }
}
