//! Cart reducer.
//!
//! [`Cart`] is plain data with pure transitions; persistence and sharing
//! live in [`crate::services::cart`]. The transitions keep two invariants:
//! at most one line per product, and every quantity at least one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopnow_core::{Price, ProductId};

use super::Product;

/// One product in the cart, with the details captured when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// `price × quantity`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::brl(self.price)
    }
}

/// Ordered list of cart lines; order is the order products were first added.
///
/// Serializes as a bare JSON array. Deserializing re-normalizes the array,
/// so a hand-edited snapshot with zero quantities or repeated products still
/// yields a valid cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|line| line.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::from_product(product)),
        }
    }

    /// Drop the line for `id`. No-op if absent.
    pub fn remove(&mut self, id: &ProductId) {
        self.lines.retain(|line| &line.id != id);
    }

    /// Replace the quantity for `id`; zero or less removes the line.
    ///
    /// Setting the quantity of a product not in the cart does nothing.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) {
        match u32::try_from(quantity) {
            Ok(q) if q > 0 => {
                if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
                    line.quantity = q;
                }
            }
            Ok(_) => self.remove(id),
            // Negative removes, anything above u32::MAX saturates.
            Err(_) if quantity < 0 => self.remove(id),
            Err(_) => {
                if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
                    line.quantity = u32::MAX;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ price × quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Σ quantity.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(raw: Vec<CartLine>) -> Self {
        let mut lines: Vec<CartLine> = Vec::with_capacity(raw.len());
        for line in raw.into_iter().filter(|line| line.quantity > 0) {
            match lines.iter_mut().find(|existing| existing.id == line.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => lines.push(line),
            }
        }
        Self { lines }
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
