//! Cart models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

/// One chosen modifier within an option group, priced as it was when the
/// item was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChoice {
    /// Modifier display name.
    pub name: String,

    /// Surcharge for this modifier.
    pub price: Decimal,
}

/// The modifiers chosen for one option group, snapshotted at add time.
///
/// Selections are immutable once stored in a line item: choosing
/// different options later creates a new line rather than mutating an
/// existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSelection {
    /// Option group title, e.g. `"Size"` or `"Toppings"`.
    pub title: String,

    /// Chosen modifiers within the group.
    pub items: Vec<OptionChoice>,
}

/// One distinct product-plus-options selection in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Menu item this line was built from.
    pub menu_item_id: String,

    /// Display name at add time.
    pub name: String,

    /// Option snapshot taken when the item was added.
    pub options: Vec<OptionSelection>,

    /// Number of units, always at least one.
    pub quantity: u32,

    /// Per-unit price including option surcharges, times `quantity`.
    pub total_price: Decimal,
}

impl CartLineItem {
    /// Build a line item. A zero quantity is normalised to one.
    #[must_use]
    pub fn new(
        menu_item_id: impl Into<String>,
        name: impl Into<String>,
        options: Vec<OptionSelection>,
        quantity: u32,
        total_price: Decimal,
    ) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            name: name.into(),
            options,
            quantity: quantity.max(1),
            total_price,
        }
    }

    /// The identity used to decide whether an add merges into this line:
    /// same menu item, identical option selections.
    #[must_use]
    pub fn merge_key(&self) -> (&str, &[OptionSelection]) {
        (&self.menu_item_id, &self.options)
    }

    /// Per-unit price including option surcharges, recovered from the
    /// stored total so surcharges scale proportionally on quantity
    /// changes.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.total_price / Decimal::from(self.quantity.max(1))
    }
}

/// The client-held, single-restaurant cart: the unit of checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Restaurant every item belongs to; `None` exactly when the cart is
    /// empty.
    pub restaurant_id: Option<String>,

    /// Display name of the bound restaurant, empty when unbound.
    pub restaurant_name: String,

    /// Line items, all from the bound restaurant.
    pub items: Vec<CartLineItem>,

    /// Sum of every line item's total price.
    pub subtotal: Decimal,

    /// Delivery fee from the server-provided checkout context.
    pub delivery_fee: Decimal,

    /// Service charge from the server-provided checkout context.
    pub service_charge: Decimal,

    /// Applied discount amount.
    pub discount: Decimal,

    /// `subtotal + delivery_fee + service_charge - discount`, floored at
    /// zero.
    pub total: Decimal,
}

impl Cart {
    /// The canonical cleared state: unbound, no items, all amounts zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            restaurant_id: None,
            restaurant_name: String::new(),
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            delivery_fee: Decimal::ZERO,
            service_charge: Decimal::ZERO,
            discount: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Re-derive `subtotal` and `total` from the item list and the
    /// current fees and discount.
    pub(crate) fn recompute_totals(&mut self) {
        self.subtotal = self.items.iter().map(|item| item.total_price).sum();
        self.total = money::non_negative(
            self.subtotal + self.delivery_fee + self.service_charge - self.discount,
        );
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn new_line_item_normalises_zero_quantity() {
        let item = CartLineItem::new("m-1", "Pho", Vec::new(), 0, dec!(8));

        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn unit_price_recovers_per_unit_amount() {
        let item = CartLineItem::new("m-1", "Pho", Vec::new(), 3, dec!(45));

        assert_eq!(item.unit_price(), dec!(15));
    }

    #[test]
    fn merge_key_distinguishes_option_selections() {
        let plain = CartLineItem::new("m-1", "Pho", Vec::new(), 1, dec!(8));
        let extra = CartLineItem::new(
            "m-1",
            "Pho",
            vec![OptionSelection {
                title: "Toppings".to_owned(),
                items: vec![OptionChoice {
                    name: "Extra beef".to_owned(),
                    price: dec!(2),
                }],
            }],
            1,
            dec!(10),
        );

        assert_ne!(plain.merge_key(), extra.merge_key());
    }

    #[test]
    fn recompute_totals_floors_total_at_zero() {
        let mut cart = Cart::empty();
        cart.items
            .push(CartLineItem::new("m-1", "Pho", Vec::new(), 1, dec!(5)));
        cart.discount = dec!(20);

        cart.recompute_totals();

        assert_eq!(cart.subtotal, dec!(5));
        assert_eq!(cart.total, Decimal::ZERO);
    }
}
