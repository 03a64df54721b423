//! Integration tests for ShopNow.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopnow-integration-tests
//! ```
//!
//! Nothing external is needed: the storefront flow runs over in-process
//! adapters and the hosted backends are stood in for by `wiremock`.
//!
//! # Test Categories
//!
//! - `storefront_flow` - Catalog, cart, auth and checkout end to end
//! - `remote_backend` - Realtime database and identity provider wire format

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use shopnow_core::Category;
use shopnow_storefront::config::{Backend, StorefrontConfig};
use shopnow_storefront::models::{Product, ProductData};
use shopnow_storefront::services::checkout::{CheckoutForm, SimulatedPayment};
use shopnow_storefront::state::{AppState, Components};

/// Configuration with no payment delay and unbounded search.
#[must_use]
pub fn test_config(backend: Backend) -> StorefrontConfig {
    StorefrontConfig {
        backend,
        data_dir: PathBuf::from("target/shopnow-test-data"),
        payment_delay: Duration::ZERO,
        search_limit: None,
    }
}

/// A storefront over in-process adapters with instant payment.
#[must_use]
pub fn memory_storefront() -> AppState {
    AppState::with_components(
        test_config(Backend::Memory),
        Components::in_memory(Arc::new(SimulatedPayment::new(Duration::ZERO))),
    )
}

#[must_use]
pub fn product_data(name: &str, category: Category, price: i64, quantity: u32) -> ProductData {
    ProductData {
        name: name.to_string(),
        category,
        price: Decimal::new(price, 0),
        quantity: Some(quantity),
        image: None,
        description: None,
    }
}

/// Create a product through the repository.
///
/// # Panics
///
/// Panics if the store rejects the write.
#[allow(clippy::expect_used)]
pub async fn seed(state: &AppState, data: ProductData) -> Product {
    state
        .products()
        .create(data)
        .await
        .expect("failed to seed product")
}

/// A checkout form with every field filled in.
#[must_use]
pub fn complete_form(email: &str) -> CheckoutForm {
    CheckoutForm {
        full_name: "Ana Souza".to_string(),
        email: email.to_string(),
        phone: "+55 81 99999-0000".to_string(),
        zip_code: "50000-000".to_string(),
        address: "Rua do Sol, 100".to_string(),
        city: "Recife".to_string(),
        card_number: "4111 1111 1111 1111".to_string(),
        card_name: "ANA SOUZA".to_string(),
        expiry: "12/30".to_string(),
        cvv: "123".to_string(),
    }
}
