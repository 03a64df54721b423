//! Catalog read helpers for the shop front and the admin dashboard.

use rust_decimal::Decimal;

use shopnow_core::StockLevel;

use crate::models::Product;

/// How many products the home page features.
pub const FEATURED_COUNT: usize = 8;

/// Dashboard counters over a product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_products: usize,
    /// Σ price × quantity, saturating at `Decimal::MAX`.
    pub stock_value: Decimal,
    /// Products with at most [`StockLevel::LOW_STOCK_THRESHOLD`] units,
    /// including those with none.
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl InventoryStats {
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut stats, product| {
            let stock = product.stock();
            stats.total_products += 1;
            stats.stock_value = stats
                .stock_value
                .saturating_add(product.price.saturating_mul(Decimal::from(stock)));
            if stock <= StockLevel::LOW_STOCK_THRESHOLD {
                stats.low_stock += 1;
            }
            if stock == 0 {
                stats.out_of_stock += 1;
            }
            stats
        })
    }
}

/// The first [`FEATURED_COUNT`] products, in listing order.
#[must_use]
pub fn featured(mut products: Vec<Product>) -> Vec<Product> {
    products.truncate(FEATURED_COUNT);
    products
}

/// Admin list filter: `term` in the name or the category, ignoring case.
#[must_use]
pub fn filter_admin<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.category.as_str().contains(&needle)
        })
        .collect()
}
