//! Cart engine.
//!
//! Owns the single active cart. Mutations apply to the in-memory cart
//! first and then persist a snapshot; the in-memory state is always the
//! source of truth for rendering, and a failed persistence write is
//! logged rather than surfaced.

use std::{fmt, sync::Arc};

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError, CartLineItem},
    storage::{KeyValueStore, keys},
};

/// Process-wide owner of the active cart.
pub struct CartEngine {
    store: Arc<dyn KeyValueStore>,
    cart: RwLock<Cart>,
}

impl fmt::Debug for CartEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartEngine").finish_non_exhaustive()
    }
}

impl CartEngine {
    /// Create an engine holding the canonical empty cart.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cart: RwLock::new(Cart::empty()),
        }
    }

    /// Hydrate the cart from the store at startup.
    ///
    /// An absent or corrupt snapshot falls back to the canonical empty
    /// cart; corruption is logged, never fatal.
    pub async fn load(&self) {
        let snapshot = match self.store.get(keys::CART).await {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => cart,
                Err(error) => {
                    warn!(%error, "discarding corrupt cart snapshot");
                    Cart::empty()
                }
            },
            Ok(None) => Cart::empty(),
            Err(error) => {
                warn!(%error, "failed to read persisted cart");
                Cart::empty()
            }
        };

        *self.cart.write().await = snapshot;
    }

    /// A copy of the current cart, for rendering and payload building.
    pub async fn snapshot(&self) -> Cart {
        self.cart.read().await.clone()
    }

    /// Whether adding from `restaurant_id` would discard the current
    /// cart. A pure precondition; the UI confirms the replacement and
    /// calls [`Self::clear`] before adding.
    pub async fn would_replace_restaurant(&self, restaurant_id: &str) -> bool {
        let cart = self.cart.read().await;

        !cart.items.is_empty() && cart.restaurant_id.as_deref() != Some(restaurant_id)
    }

    /// Add an item from the given restaurant.
    ///
    /// An empty cart binds to the restaurant. An addition whose merge key
    /// matches an existing line merges into it, summing quantities and
    /// total prices; otherwise the item is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DifferentRestaurant`] when the cart is bound
    /// elsewhere; the cart is untouched.
    pub async fn add_item(
        &self,
        restaurant_id: &str,
        restaurant_name: &str,
        item: CartLineItem,
    ) -> Result<Cart, CartError> {
        let snapshot = {
            let mut cart = self.cart.write().await;

            if !cart.items.is_empty() && cart.restaurant_id.as_deref() != Some(restaurant_id) {
                return Err(CartError::DifferentRestaurant(
                    cart.restaurant_name.clone(),
                    restaurant_name.to_owned(),
                ));
            }

            if cart.items.is_empty() {
                cart.restaurant_id = Some(restaurant_id.to_owned());
                cart.restaurant_name = restaurant_name.to_owned();
            }

            match cart
                .items
                .iter_mut()
                .find(|line| line.merge_key() == item.merge_key())
            {
                Some(line) => {
                    line.quantity += item.quantity;
                    line.total_price += item.total_price;
                }
                None => cart.items.push(item),
            }

            cart.recompute_totals();
            cart.clone()
        };

        debug!(
            restaurant = %snapshot.restaurant_name,
            lines = snapshot.items.len(),
            "item added to cart"
        );

        self.persist(&snapshot).await;

        Ok(snapshot)
    }

    /// Change the quantity of the line at `index`.
    ///
    /// A zero quantity removes the line. Otherwise the line's total price
    /// is rescaled from its preserved unit price, so option surcharges
    /// scale proportionally without re-resolving option prices.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown index.
    pub async fn update_quantity(&self, index: usize, quantity: u32) -> Result<Cart, CartError> {
        if quantity == 0 {
            return self.remove_item(index).await;
        }

        let snapshot = {
            let mut cart = self.cart.write().await;

            let line = cart
                .items
                .get_mut(index)
                .ok_or(CartError::ItemNotFound(index))?;

            line.total_price = line.unit_price() * Decimal::from(quantity);
            line.quantity = quantity;

            cart.recompute_totals();
            cart.clone()
        };

        self.persist(&snapshot).await;

        Ok(snapshot)
    }

    /// Remove the line at `index`. Removing the last line resets the
    /// whole cart to the canonical empty state, unbinding the restaurant.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown index.
    pub async fn remove_item(&self, index: usize) -> Result<Cart, CartError> {
        let snapshot = {
            let mut cart = self.cart.write().await;

            if index >= cart.items.len() {
                return Err(CartError::ItemNotFound(index));
            }

            cart.items.remove(index);

            if cart.items.is_empty() {
                *cart = Cart::empty();
            } else {
                cart.recompute_totals();
            }

            cart.clone()
        };

        self.persist(&snapshot).await;

        Ok(snapshot)
    }

    /// Replace the delivery fee from the server-provided checkout
    /// context and recompute the total.
    pub async fn set_delivery_fee(&self, fee: Decimal) -> Cart {
        self.apply(|cart| cart.delivery_fee = fee).await
    }

    /// Replace the service charge from the server-provided checkout
    /// context and recompute the total.
    pub async fn set_service_charge(&self, charge: Decimal) -> Cart {
        self.apply(|cart| cart.service_charge = charge).await
    }

    /// Replace the discount amount and recompute the total.
    pub async fn apply_discount(&self, amount: Decimal) -> Cart {
        self.apply(|cart| cart.discount = amount).await
    }

    /// Unconditional reset to the canonical empty cart.
    pub async fn clear(&self) {
        let snapshot = {
            let mut cart = self.cart.write().await;
            *cart = Cart::empty();
            cart.clone()
        };

        debug!("cart cleared");

        self.persist(&snapshot).await;
    }

    async fn apply<F>(&self, mutate: F) -> Cart
    where
        F: FnOnce(&mut Cart),
    {
        let snapshot = {
            let mut cart = self.cart.write().await;

            mutate(&mut cart);
            cart.recompute_totals();
            cart.clone()
        };

        self.persist(&snapshot).await;

        snapshot
    }

    /// Persist a snapshot. An empty cart is represented by an absent key.
    async fn persist(&self, cart: &Cart) {
        if cart.is_empty() {
            if let Err(error) = self.store.remove(keys::CART).await {
                warn!(%error, "failed to clear persisted cart");
            }

            return;
        }

        match serde_json::to_string(cart) {
            Ok(raw) => {
                if let Err(error) = self.store.put(keys::CART, &raw).await {
                    warn!(%error, "failed to persist cart");
                }
            }
            Err(error) => warn!(%error, "failed to encode cart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;
    use testresult::TestResult;

    use super::*;
    use crate::storage::MemoryStore;

    fn engine() -> CartEngine {
        CartEngine::new(Arc::new(MemoryStore::new()))
    }

    fn pho(quantity: u32, total_price: Decimal) -> CartLineItem {
        CartLineItem::new("m-pho", "Pho Bo", Vec::new(), quantity, total_price)
    }

    #[tokio::test]
    async fn first_add_binds_the_restaurant() -> TestResult {
        let engine = engine();

        let cart = engine.add_item("r-1", "Pho Palace", pho(1, dec!(8))).await?;

        assert_eq!(cart.restaurant_id.as_deref(), Some("r-1"));
        assert_eq!(cart.restaurant_name, "Pho Palace");

        Ok(())
    }

    #[tokio::test]
    async fn add_from_another_restaurant_is_rejected() -> TestResult {
        let engine = engine();

        engine.add_item("r-1", "Pho Palace", pho(1, dec!(8))).await?;

        let result = engine
            .add_item("r-2", "Banh Mi Bar", pho(1, dec!(8)))
            .await;

        assert_eq!(
            result,
            Err(CartError::DifferentRestaurant(
                "Pho Palace".to_owned(),
                "Banh Mi Bar".to_owned()
            ))
        );

        Ok(())
    }

    #[tokio::test]
    async fn would_replace_restaurant_is_pure() -> TestResult {
        let engine = engine();

        assert!(!engine.would_replace_restaurant("r-1").await);

        engine.add_item("r-1", "Pho Palace", pho(1, dec!(8))).await?;

        assert!(!engine.would_replace_restaurant("r-1").await);
        assert!(engine.would_replace_restaurant("r-2").await);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_index_is_rejected() -> TestResult {
        let engine = engine();

        engine.add_item("r-1", "Pho Palace", pho(1, dec!(8))).await?;

        assert_eq!(
            engine.update_quantity(5, 2).await,
            Err(CartError::ItemNotFound(5))
        );
        assert_eq!(engine.remove_item(5).await, Err(CartError::ItemNotFound(5)));

        Ok(())
    }
}
