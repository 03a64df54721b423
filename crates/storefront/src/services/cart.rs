//! Shared, persisted cart.
//!
//! Wraps the [`Cart`] reducer with a lock and a key-value snapshot. Every
//! mutation writes the whole cart back; a failed write is logged and the
//! in-memory cart stays authoritative.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use shopnow_core::ProductId;

use crate::models::{Cart, CartLine, Product};
use crate::storage::KeyValueStore;

/// Storage key for the cart snapshot.
pub const CART_STORAGE_KEY: &str = "shopnow-cart";

/// Cart state shared across the application.
#[derive(Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
    storage: Arc<dyn KeyValueStore>,
}

impl CartState {
    /// Rehydrate the cart from `storage`.
    ///
    /// A missing snapshot gives an empty cart; so does one that cannot be
    /// read or parsed, which is logged.
    #[must_use]
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let cart = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable cart snapshot");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "failed to load cart snapshot");
                Cart::new()
            }
        };
        debug!(lines = cart.lines().len(), "cart loaded");

        Self {
            cart: Arc::new(Mutex::new(cart)),
            storage,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` and write the resulting cart to storage.
    fn mutate(&self, f: impl FnOnce(&mut Cart)) {
        let mut cart = self.lock();
        f(&mut cart);

        let saved = serde_json::to_string(&*cart)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.storage
                    .save(CART_STORAGE_KEY, &raw)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = saved {
            warn!(%error, "failed to persist cart");
        }
    }

    /// Add one unit of `product`.
    pub fn add(&self, product: &Product) {
        self.mutate(|cart| cart.add(product));
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&self, id: &ProductId) {
        self.mutate(|cart| cart.remove(id));
    }

    /// Set the quantity for `id`; zero or less removes the line.
    pub fn set_quantity(&self, id: &ProductId, quantity: i64) {
        self.mutate(|cart| cart.set_quantity(id, quantity));
    }

    /// Empty the cart and its snapshot.
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().subtotal()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }
}
