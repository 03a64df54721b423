//! Order confirmation hand-off.
//!
//! Orders are never stored. Checkout returns an [`OrderSummary`] by value
//! and the confirmation view renders it once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopnow_core::Email;

use super::CartLine;

/// Delivery and contact details captured at checkout. Card data is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub zip_code: String,
    pub address: String,
    pub city: String,
}

/// What the buyer sees after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// `SN` followed by the placement time in Unix milliseconds.
    pub order_number: String,
    /// Cart lines as they were when the order was placed.
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub customer: CustomerDetails,
    pub placed_at: DateTime<Utc>,
}

impl OrderSummary {
    /// Order number for an order placed at `placed_at`.
    #[must_use]
    pub fn order_number_for(placed_at: DateTime<Utc>) -> String {
        format!("SN{}", placed_at.timestamp_millis())
    }

    /// Σ quantity over the ordered lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}
