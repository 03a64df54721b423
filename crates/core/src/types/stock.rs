//! Stock level classification.

use serde::{Deserialize, Serialize};

/// Stock badge shown next to a product.
///
/// Derived purely from the stored stock count; the store itself never
/// reserves or decrements stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// Nothing left; the product cannot be added to the cart.
    OutOfStock,
    /// At or below [`StockLevel::LOW_STOCK_THRESHOLD`] units.
    Low,
    InStock,
}

impl StockLevel {
    /// Counts at or below this are reported as low stock.
    pub const LOW_STOCK_THRESHOLD: u32 = 5;

    /// Classify a stock count.
    #[must_use]
    pub const fn from_quantity(quantity: u32) -> Self {
        if quantity == 0 {
            Self::OutOfStock
        } else if quantity <= Self::LOW_STOCK_THRESHOLD {
            Self::Low
        } else {
            Self::InStock
        }
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::OutOfStock)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::Low => "Low stock",
            Self::InStock => "In stock",
        }
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(StockLevel::from_quantity(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::from_quantity(1), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(5), StockLevel::Low);
        assert_eq!(StockLevel::from_quantity(6), StockLevel::InStock);
    }

    #[test]
    fn test_availability() {
        assert!(!StockLevel::OutOfStock.is_available());
        assert!(StockLevel::Low.is_available());
        assert!(StockLevel::InStock.is_available());
    }
}
