//! Checkout.
//!
//! Delivery fields default to the stored profile; any flag given here
//! replaces the prefilled value.

use clap::Args;
use shopnow_storefront::error::AppError;
use shopnow_storefront::services::checkout::{CheckoutEntry, CheckoutForm, Redirect};
use shopnow_storefront::state::AppState;

use crate::render;

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// CEP
    #[arg(long = "zip")]
    zip_code: Option<String>,

    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    card_number: Option<String>,

    /// Name as printed on the card
    #[arg(long)]
    card_name: Option<String>,

    /// MM/YY
    #[arg(long)]
    expiry: Option<String>,

    #[arg(long)]
    cvv: Option<String>,
}

impl CheckoutArgs {
    fn apply(self, form: &mut CheckoutForm) {
        let fields = [
            (self.full_name, &mut form.full_name),
            (self.email, &mut form.email),
            (self.phone, &mut form.phone),
            (self.zip_code, &mut form.zip_code),
            (self.address, &mut form.address),
            (self.city, &mut form.city),
            (self.card_number, &mut form.card_number),
            (self.card_name, &mut form.card_name),
            (self.expiry, &mut form.expiry),
            (self.cvv, &mut form.cvv),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

pub async fn run(state: &AppState, args: CheckoutArgs) -> Result<(), AppError> {
    let flow = match state.checkout().begin().await {
        CheckoutEntry::Ready(flow) => flow,
        CheckoutEntry::Redirect(Redirect::Login { return_to }) => {
            return Err(AppError::BadRequest(format!(
                "sign in first (shopnow auth login), then return to {return_to}"
            )));
        }
        CheckoutEntry::Redirect(Redirect::Cart) => {
            return Err(AppError::BadRequest("your cart is empty".to_string()));
        }
    };

    let mut form = flow.form().clone();
    args.apply(&mut form);

    render::totals(&flow.totals());
    render::notice("Processing payment...");

    let summary = flow.submit(&form).await?;
    tracing::info!(order = %summary.order_number, "Order placed");
    render::order(&summary);
    Ok(())
}
