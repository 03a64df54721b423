//! End-to-end storefront flow over in-process adapters.
//!
//! Browse the catalog, fill the cart, sign up and check out, the way the
//! CLI drives the services.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use shopnow_core::Category;
use shopnow_integration_tests::{complete_form, memory_storefront, product_data, seed};
use shopnow_storefront::error::AppError;
use shopnow_storefront::models::{ProductForm, ProfileDetails};
use shopnow_storefront::services::auth::AuthState;
use shopnow_storefront::services::catalog::InventoryStats;
use shopnow_storefront::services::checkout::{
    CheckoutEntry, CheckoutError, CheckoutStatus, Redirect,
};

// ============================================================================
// Cart totals
// ============================================================================

#[tokio::test]
async fn test_two_products_below_free_shipping() {
    let state = memory_storefront();
    let a = seed(&state, product_data("A", Category::Camisas, 20, 10)).await;
    let b = seed(&state, product_data("B", Category::Acessorios, 15, 10)).await;

    let cart = state.cart();
    cart.add(&a);
    cart.add(&a);
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.subtotal(), Decimal::new(40, 0));

    cart.add(&b);
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.subtotal(), Decimal::new(55, 0));

    state
        .auth()
        .sign_up("ana@example.com", "segredo1", ProfileDetails::default())
        .await
        .unwrap();
    let CheckoutEntry::Ready(flow) = state.checkout().begin().await else {
        panic!("expected checkout to open");
    };
    let totals = flow.totals();
    assert_eq!(totals.shipping, Decimal::new(15, 0));
    assert_eq!(totals.total, Decimal::new(70, 0));
}

#[tokio::test]
async fn test_set_quantity_zero_empties_cart() {
    let state = memory_storefront();
    let a = seed(&state, product_data("A", Category::Camisas, 20, 10)).await;

    state.cart().add(&a);
    state.cart().set_quantity(&a.id, 0);

    assert!(state.cart().is_empty());
}

#[tokio::test]
async fn test_shipping_is_free_from_threshold() {
    let state = memory_storefront();
    let tenis = seed(&state, product_data("Tenis Run", Category::Tenis, 75, 10)).await;
    state.cart().add(&tenis);
    state.cart().add(&tenis);
    state
        .auth()
        .sign_up("ana@example.com", "segredo1", ProfileDetails::default())
        .await
        .unwrap();

    let CheckoutEntry::Ready(flow) = state.checkout().begin().await else {
        panic!("expected checkout to open");
    };
    assert_eq!(flow.totals().subtotal, Decimal::new(150, 0));
    assert_eq!(flow.totals().shipping, Decimal::ZERO);
    assert_eq!(flow.totals().total, Decimal::new(150, 0));
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_redirects_before_sign_in_then_places_order() {
    let state = memory_storefront();
    let camisa = seed(&state, product_data("Camisa Polo", Category::Camisas, 90, 3)).await;

    match state.checkout().begin().await {
        CheckoutEntry::Redirect(Redirect::Login { return_to }) => {
            assert_eq!(return_to, "/checkout");
        }
        _ => panic!("expected a login redirect"),
    }

    state
        .auth()
        .sign_up(
            "ana@example.com",
            "segredo1",
            ProfileDetails {
                name: Some("Ana Souza".to_string()),
                address: Some("Rua do Sol, 100".to_string()),
                city: Some("Recife".to_string()),
                phone: Some("+55 81 99999-0000".to_string()),
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        state.checkout().begin().await,
        CheckoutEntry::Redirect(Redirect::Cart)
    ));

    state.cart().add(&camisa);
    let CheckoutEntry::Ready(flow) = state.checkout().begin().await else {
        panic!("expected checkout to open");
    };
    assert_eq!(flow.form().full_name, "Ana Souza");
    assert_eq!(flow.form().city, "Recife");
    assert!(flow.form().zip_code.is_empty());

    let summary = flow
        .submit(&complete_form("ana@example.com"))
        .await
        .unwrap();

    assert!(summary.order_number.starts_with("SN"));
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.subtotal, Decimal::new(90, 0));
    assert_eq!(summary.shipping, Decimal::new(15, 0));
    assert_eq!(summary.total, Decimal::new(105, 0));
    assert!(state.cart().is_empty());
    assert_eq!(flow.status(), CheckoutStatus::Success(summary));
}

#[tokio::test]
async fn test_incomplete_form_is_rejected_and_cart_kept() {
    let state = memory_storefront();
    let camisa = seed(&state, product_data("Camisa", Category::Camisas, 50, 3)).await;
    state
        .auth()
        .sign_up("ana@example.com", "segredo1", ProfileDetails::default())
        .await
        .unwrap();
    state.cart().add(&camisa);

    let CheckoutEntry::Ready(flow) = state.checkout().begin().await else {
        panic!("expected checkout to open");
    };
    let mut form = complete_form("ana@example.com");
    form.cvv.clear();

    let err = flow.submit(&form).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Validation(_)));
    assert_eq!(flow.status(), CheckoutStatus::Idle);
    assert_eq!(state.cart().item_count(), 1);

    let app_err = AppError::from(err);
    assert!(!app_err.is_internal());
}

// ============================================================================
// Catalog admin
// ============================================================================

#[tokio::test]
async fn test_admin_edit_and_stats() {
    let state = memory_storefront();
    seed(&state, product_data("Camisa", Category::Camisas, 50, 2)).await;
    let tenis = seed(&state, product_data("Tenis", Category::Tenis, 200, 10)).await;
    seed(&state, product_data("Bone", Category::Acessorios, 30, 0)).await;

    let products = state.products().list_all().await.unwrap();
    let stats = InventoryStats::from_products(&products);
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.stock_value, Decimal::new(2100, 0));
    assert_eq!(stats.low_stock, 2);
    assert_eq!(stats.out_of_stock, 1);

    let mut form = ProductForm::from_product(&tenis);
    form.price = "189,90".to_string();
    let updated = state
        .products()
        .update(&tenis.id, form.validate().unwrap())
        .await
        .unwrap();
    assert_eq!(updated.price, Decimal::new(18990, 2));
    assert!(updated.created_at.is_none());

    let tenis_only = state
        .products()
        .list_by_category(Category::Tenis)
        .await
        .unwrap();
    assert_eq!(tenis_only, vec![updated]);

    state.products().delete(&tenis.id).await.unwrap();
    assert_eq!(state.products().list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let state = memory_storefront();
    seed(&state, product_data("Camisa Polo", Category::Camisas, 90, 3)).await;
    seed(&state, product_data("Tenis Runner", Category::Tenis, 300, 3)).await;

    let found = state.products().search_by_name("POLO").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().unwrap().name, "Camisa Polo");
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_session_observers_see_sign_in_and_out() {
    let state = memory_storefront();
    let mut subscription = state.session().subscribe();
    assert_eq!(subscription.current(), AuthState::SignedOut);

    state
        .auth()
        .sign_up("ana@example.com", "segredo1", ProfileDetails::default())
        .await
        .unwrap();
    let signed_in = subscription.changed().await.unwrap();
    assert_eq!(signed_in.identity().unwrap().email.as_str(), "ana@example.com");

    state.auth().sign_out();
    assert_eq!(subscription.changed().await.unwrap(), AuthState::SignedOut);
    subscription.unsubscribe();
}
