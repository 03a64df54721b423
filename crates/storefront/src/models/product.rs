//! Catalog product types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopnow_core::{Category, Price, ProductId, StockLevel};

use super::{ValidationError, optional, required};

/// Highest unit price the admin form accepts, in reais.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Highest stock count the admin form accepts.
pub const MAX_QUANTITY: u32 = 1_000_000;

/// A product as stored under `products/{id}`.
///
/// The database does not enforce a schema, so everything a full-overwrite
/// update may drop is optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Document key. Also written into the document body.
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    pub category: Category,
    /// Unit price in reais.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units in stock. Missing means unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Build a product document from validated data.
    #[must_use]
    pub fn from_data(
        id: ProductId,
        data: ProductData,
        created_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: data.name,
            category: data.category,
            price: data.price,
            quantity: data.quantity,
            image: data.image,
            description: data.description,
            created_at,
            updated_at: Some(updated_at),
        }
    }

    /// Units in stock, treating a missing count as zero.
    #[must_use]
    pub fn stock(&self) -> u32 {
        self.quantity.unwrap_or(0)
    }

    /// Stock badge for this product.
    #[must_use]
    pub fn stock_level(&self) -> StockLevel {
        StockLevel::from_quantity(self.stock())
    }

    /// Unit price in the store currency.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::brl(self.price)
    }

    /// The editable fields of this product.
    #[must_use]
    pub fn data(&self) -> ProductData {
        ProductData {
            name: self.name.clone(),
            category: self.category,
            price: self.price,
            quantity: self.quantity,
            image: self.image.clone(),
            description: self.description.clone(),
        }
    }
}

/// The caller-supplied part of a product, used for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductData {
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    pub quantity: Option<u32>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Raw admin form input.
///
/// Every field is text as typed; [`ProductForm::validate`] turns it into
/// [`ProductData`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl ProductForm {
    /// Prefill the form from an existing product.
    ///
    /// A product stored without a stock count prefills as `0`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.as_str().to_owned(),
            price: product.price.to_string(),
            quantity: product.stock().to_string(),
            image: product.image.clone(),
            description: product.description.clone(),
        }
    }

    /// Check the form without contacting the store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`]: blank name, category, price or
    /// quantity; unknown category; price that is not a number above zero
    /// and at most [`MAX_PRICE`]; quantity that is not a whole number from
    /// zero to [`MAX_QUANTITY`].
    pub fn validate(&self) -> Result<ProductData, ValidationError> {
        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let price = required("price", &self.price)?;
        let quantity = required("quantity", &self.quantity)?;

        let category = Category::from_str(&category).map_err(|e| ValidationError::Invalid {
            field: "category",
            reason: e.to_string(),
        })?;

        let price = Decimal::from_str(&price.replace(',', ".")).map_err(|_| {
            ValidationError::Invalid {
                field: "price",
                reason: format!("{price:?} is not a number"),
            }
        })?;
        if price <= Decimal::ZERO {
            return Err(ValidationError::Invalid {
                field: "price",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if price > MAX_PRICE {
            return Err(ValidationError::Invalid {
                field: "price",
                reason: format!("must be at most {MAX_PRICE}"),
            });
        }

        let quantity = quantity
            .parse::<i64>()
            .map_err(|_| ValidationError::Invalid {
                field: "quantity",
                reason: format!("{quantity:?} is not a whole number"),
            })?;
        if quantity < 0 {
            return Err(ValidationError::Invalid {
                field: "quantity",
                reason: "cannot be negative".to_owned(),
            });
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(|| ValidationError::Invalid {
                field: "quantity",
                reason: format!("must be at most {MAX_QUANTITY}"),
            })?;

        Ok(ProductData {
            name,
            category,
            price,
            quantity: Some(quantity),
            image: optional(self.image.as_deref()),
            description: optional(self.description.as_deref()),
        })
    }
}
