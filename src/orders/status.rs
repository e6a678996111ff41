//! Order status vocabulary.
//!
//! Statuses are server-owned; the client never transitions them. It only
//! reads a status code and applies the classification below to decide
//! which order actions are legal.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status code outside the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown order status code {0}")]
pub struct UnknownStatusCode(pub u8);

/// Lifecycle stage of a submitted order.
///
/// Wire-encoded as the integer codes 0 through 7. The declaration order
/// is the progression order: `Pending < Confirmed < ... < Delivered`,
/// with `Cancelled` and `Rejected` as non-progressing terminal outcomes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderStatus {
    /// Accepted by the client, not yet confirmed by the restaurant.
    Pending = 0,

    /// Confirmed by the restaurant.
    Confirmed = 1,

    /// Being prepared.
    Preparing = 2,

    /// Ready for the courier to collect.
    ReadyForPickup = 3,

    /// With the courier.
    OutForDelivery = 4,

    /// Delivered to the customer.
    Delivered = 5,

    /// Cancelled before completion.
    Cancelled = 6,

    /// Rejected by the restaurant.
    Rejected = 7,
}

/// Coarse classification of a status, driving which actions the UI
/// offers for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    /// Placed but not yet confirmed.
    PreActive,

    /// Confirmed and progressing towards delivery.
    Active,

    /// Delivered.
    Completed,

    /// Cancelled or rejected; no further actions apply.
    Cancelled,
}

impl OrderStatus {
    /// The integer wire code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Classify this status into its phase.
    #[must_use]
    pub fn phase(self) -> OrderPhase {
        match self {
            Self::Pending => OrderPhase::PreActive,
            Self::Confirmed | Self::Preparing | Self::ReadyForPickup | Self::OutForDelivery => {
                OrderPhase::Active
            }
            Self::Delivered => OrderPhase::Completed,
            Self::Cancelled | Self::Rejected => OrderPhase::Cancelled,
        }
    }

    /// Whether the order is confirmed and not yet delivered.
    #[must_use]
    pub fn is_active(self) -> bool {
        self.phase() == OrderPhase::Active
    }

    /// Whether live tracking applies. Tracking is offered exactly for
    /// the active range.
    #[must_use]
    pub fn can_track(self) -> bool {
        self.is_active()
    }

    /// Whether the order can seed a reorder.
    #[must_use]
    pub fn can_reorder(self) -> bool {
        self == Self::Delivered
    }

    /// Whether the order can be rated.
    #[must_use]
    pub fn can_rate(self) -> bool {
        self == Self::Delivered
    }

    /// Whether the customer may still cancel. Only pre-confirmation
    /// orders are customer-cancellable.
    #[must_use]
    pub fn can_cancel(self) -> bool {
        self == Self::Pending
    }
}

impl From<OrderStatus> for u8 {
    fn from(status: OrderStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for OrderStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Confirmed),
            2 => Ok(Self::Preparing),
            3 => Ok(Self::ReadyForPickup),
            4 => Ok(Self::OutForDelivery),
            5 => Ok(Self::Delivered),
            6 => Ok(Self::Cancelled),
            7 => Ok(Self::Rejected),
            other => Err(UnknownStatusCode(other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Preparing => "Preparing",
            Self::ReadyForPickup => "Ready for pickup",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Rejected => "Rejected",
        };

        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() -> Result<(), UnknownStatusCode> {
        for code in 0..=7 {
            let status = OrderStatus::try_from(code)?;

            assert_eq!(status.code(), code);
        }

        Ok(())
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(OrderStatus::try_from(8), Err(UnknownStatusCode(8)));
    }

    #[test]
    fn progression_order_matches_codes() {
        assert!(OrderStatus::Pending < OrderStatus::Confirmed);
        assert!(OrderStatus::OutForDelivery < OrderStatus::Delivered);
    }

    #[test]
    fn phases_partition_the_vocabulary() {
        assert_eq!(OrderStatus::Pending.phase(), OrderPhase::PreActive);
        assert_eq!(OrderStatus::Confirmed.phase(), OrderPhase::Active);
        assert_eq!(OrderStatus::Preparing.phase(), OrderPhase::Active);
        assert_eq!(OrderStatus::ReadyForPickup.phase(), OrderPhase::Active);
        assert_eq!(OrderStatus::OutForDelivery.phase(), OrderPhase::Active);
        assert_eq!(OrderStatus::Delivered.phase(), OrderPhase::Completed);
        assert_eq!(OrderStatus::Cancelled.phase(), OrderPhase::Cancelled);
        assert_eq!(OrderStatus::Rejected.phase(), OrderPhase::Cancelled);
    }

    #[test]
    fn tracking_is_offered_exactly_for_the_active_range() {
        let trackable: Vec<u8> = (0..=7)
            .filter(|&code| {
                OrderStatus::try_from(code).is_ok_and(OrderStatus::can_track)
            })
            .collect();

        assert_eq!(trackable, vec![1, 2, 3, 4]);
    }

    #[test]
    fn terminal_failure_disables_all_actions() {
        for status in [OrderStatus::Cancelled, OrderStatus::Rejected] {
            assert!(!status.can_track());
            assert!(!status.can_reorder());
            assert!(!status.can_rate());
            assert!(!status.can_cancel());
        }
    }

    #[test]
    fn only_pending_orders_are_customer_cancellable() {
        let cancellable: Vec<OrderStatus> = (0..=7)
            .filter_map(|code| OrderStatus::try_from(code).ok())
            .filter(|status| status.can_cancel())
            .collect();

        assert_eq!(cancellable, vec![OrderStatus::Pending]);
    }

    #[test]
    fn wire_encoding_is_the_integer_code() {
        let encoded = serde_json::to_string(&OrderStatus::OutForDelivery)
            .unwrap_or_default();

        assert_eq!(encoded, "4");
    }
}
