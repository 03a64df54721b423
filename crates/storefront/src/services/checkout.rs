//! Checkout flow.
//!
//! [`CheckoutService::begin`] applies the entry guards (signed in, cart not
//! empty) and hands back a [`CheckoutFlow`] with a form prefilled from the
//! profile. The flow moves `Idle → Submitting → Success | Failed`; a failed
//! attempt may be resubmitted, a successful one may not.
//!
//! Payment is simulated. Nothing about the order is stored: on success the
//! cart is cleared and an [`OrderSummary`] is returned to the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{instrument, warn};

use shopnow_core::Email;

use super::auth::AuthService;
use super::cart::CartState;
use crate::models::{CustomerDetails, OrderSummary, UserProfile, ValidationError, required};

/// Subtotal from which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Flat shipping fee below [`FREE_SHIPPING_THRESHOLD`].
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Route the login page sends the user back to.
pub const CHECKOUT_ROUTE: &str = "/checkout";

/// Shipping charged for `subtotal`.
#[must_use]
pub fn shipping_for(subtotal: Decimal) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    }
}

/// Order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl Totals {
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let shipping = shipping_for(subtotal);
        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Payment gateway failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),
}

/// Errors from submitting a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form has a missing or malformed field.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission is already in flight.
    #[error("checkout is already being submitted")]
    AlreadySubmitting,

    /// The order was already placed.
    #[error("checkout already completed")]
    AlreadyCompleted,

    /// The cart was emptied after checkout began.
    #[error("cart is empty")]
    EmptyCart,

    /// The gateway refused the payment.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

// =============================================================================
// Payment
// =============================================================================

/// Card data. Never logged and never part of the order summary.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub card_number: SecretString,
    pub card_name: String,
    pub expiry: String,
    pub cvv: SecretString,
}

/// Port over the payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` to the card.
    async fn charge(&self, amount: Decimal, payment: &PaymentDetails) -> Result<(), PaymentError>;
}

/// Gateway that waits a fixed delay and approves every payment.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPayment {
    delay: Duration,
}

impl SimulatedPayment {
    /// Default processing delay.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedPayment {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPayment {
    #[instrument(skip(self, _payment))]
    async fn charge(&self, amount: Decimal, _payment: &PaymentDetails) -> Result<(), PaymentError> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(%amount, "simulated payment approved");
        Ok(())
    }
}

// =============================================================================
// Form
// =============================================================================

/// Checkout form as typed by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub zip_code: String,
    pub address: String,
    pub city: String,
    pub card_number: String,
    pub card_name: String,
    pub expiry: String,
    pub cvv: String,
}

impl CheckoutForm {
    /// A form with delivery fields taken from `profile`.
    #[must_use]
    pub fn prefilled(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.name.clone().unwrap_or_default(),
            email: profile.email.to_string(),
            phone: profile.phone.clone().unwrap_or_default(),
            address: profile.address.clone().unwrap_or_default(),
            city: profile.city.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Check every field without contacting the gateway.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`]: a blank field, or an email that
    /// does not parse.
    pub fn validate(&self) -> Result<(CustomerDetails, PaymentDetails), ValidationError> {
        let full_name = required("full name", &self.full_name)?;
        let email = required("email", &self.email)?;
        let phone = required("phone", &self.phone)?;
        let zip_code = required("zip code", &self.zip_code)?;
        let address = required("address", &self.address)?;
        let city = required("city", &self.city)?;
        let card_number = required("card number", &self.card_number)?;
        let card_name = required("name on card", &self.card_name)?;
        let expiry = required("expiry", &self.expiry)?;
        let cvv = required("cvv", &self.cvv)?;

        let email = Email::parse(&email).map_err(|e| ValidationError::Invalid {
            field: "email",
            reason: e.to_string(),
        })?;

        Ok((
            CustomerDetails {
                full_name,
                email,
                phone,
                zip_code,
                address,
                city,
            },
            PaymentDetails {
                card_number: SecretString::from(card_number),
                card_name,
                expiry,
                cvv: SecretString::from(cvv),
            },
        ))
    }
}

// =============================================================================
// Flow
// =============================================================================

/// Where to send the buyer instead of checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Sign in first, then come back to `return_to`.
    Login { return_to: &'static str },
    /// Nothing to check out.
    Cart,
}

/// Result of entering checkout.
pub enum CheckoutEntry {
    Ready(CheckoutFlow),
    Redirect(Redirect),
}

/// State of a checkout attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutStatus {
    #[default]
    Idle,
    Submitting,
    Success(OrderSummary),
    Failed(String),
}

/// Entry point for checkout.
#[derive(Clone)]
pub struct CheckoutService {
    cart: CartState,
    auth: AuthService,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    #[must_use]
    pub fn new(cart: CartState, auth: AuthService, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            cart,
            auth,
            gateway,
        }
    }

    /// Enter checkout.
    ///
    /// Redirects to login when signed out and to the cart when it is empty.
    /// Otherwise returns a flow whose form is prefilled from the profile; a
    /// profile that cannot be read leaves the form blank.
    #[instrument(skip(self))]
    pub async fn begin(&self) -> CheckoutEntry {
        if self.auth.current_identity().is_none() {
            return CheckoutEntry::Redirect(Redirect::Login {
                return_to: CHECKOUT_ROUTE,
            });
        }
        if self.cart.is_empty() {
            return CheckoutEntry::Redirect(Redirect::Cart);
        }

        let form = match self.auth.profile().await {
            Ok(Some(profile)) => CheckoutForm::prefilled(&profile),
            Ok(None) => CheckoutForm::default(),
            Err(e) => {
                warn!(error = %e, "failed to load profile for checkout");
                CheckoutForm::default()
            }
        };

        CheckoutEntry::Ready(CheckoutFlow {
            status: Arc::new(Mutex::new(CheckoutStatus::Idle)),
            form,
            cart: self.cart.clone(),
            gateway: Arc::clone(&self.gateway),
        })
    }
}

/// One checkout attempt.
///
/// Clones share the same status, so a second submit from anywhere is
/// rejected while the first is in flight.
#[derive(Clone)]
pub struct CheckoutFlow {
    status: Arc<Mutex<CheckoutStatus>>,
    form: CheckoutForm,
    cart: CartState,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutFlow {
    fn lock(&self) -> MutexGuard<'_, CheckoutStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn status(&self) -> CheckoutStatus {
        self.lock().clone()
    }

    /// The form as prefilled on entry.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Totals for the cart as it is now.
    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::for_subtotal(self.cart.subtotal())
    }

    /// Validate `form`, take payment and place the order.
    ///
    /// On success the cart is cleared and the summary, built from the cart
    /// as it was before clearing, is returned. On payment failure the cart
    /// is kept and the flow moves to `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` without changing state if the
    /// form is incomplete, `AlreadySubmitting` / `AlreadyCompleted` if the
    /// flow is not accepting submissions, `EmptyCart` if the cart was
    /// emptied meanwhile and `Payment` if the gateway refuses.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &CheckoutForm) -> Result<OrderSummary, CheckoutError> {
        let (customer, payment) = {
            let mut status = self.lock();
            match *status {
                CheckoutStatus::Submitting => return Err(CheckoutError::AlreadySubmitting),
                CheckoutStatus::Success(_) => return Err(CheckoutError::AlreadyCompleted),
                CheckoutStatus::Idle | CheckoutStatus::Failed(_) => {}
            }
            let validated = form.validate()?;
            *status = CheckoutStatus::Submitting;
            validated
        };

        let cart = self.cart.snapshot();
        if cart.is_empty() {
            *self.lock() = CheckoutStatus::Failed(CheckoutError::EmptyCart.to_string());
            return Err(CheckoutError::EmptyCart);
        }
        let totals = Totals::for_subtotal(cart.subtotal());

        if let Err(e) = self.gateway.charge(totals.total, &payment).await {
            warn!(error = %e, "payment failed");
            *self.lock() = CheckoutStatus::Failed(e.to_string());
            return Err(e.into());
        }

        let placed_at = Utc::now();
        let summary = OrderSummary {
            order_number: OrderSummary::order_number_for(placed_at),
            lines: cart.lines().to_vec(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
            customer,
            placed_at,
        };

        self.cart.clear();
        *self.lock() = CheckoutStatus::Success(summary.clone());
        tracing::info!(order = %summary.order_number, total = %summary.total, "order placed");
        Ok(summary)
    }
}
