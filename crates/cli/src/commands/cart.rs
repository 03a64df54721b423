//! Cart contents.

use clap::Subcommand;
use shopnow_core::ProductId;
use shopnow_storefront::error::AppError;
use shopnow_storefront::state::AppState;

use crate::render;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a product line
    Remove {
        /// Product ID
        id: String,
    },
    /// Set the quantity of a line; zero or less removes it
    Set {
        /// Product ID
        id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(state: &AppState, action: CartAction) -> Result<(), AppError> {
    let cart = state.cart();

    match action {
        CartAction::Show => {}
        CartAction::Add { id } => {
            let product = state.products().get(&ProductId::new(id)).await?;
            if !product.stock_level().is_available() {
                return Err(AppError::BadRequest(format!(
                    "{} is out of stock",
                    product.name
                )));
            }
            cart.add(&product);
            render::notice(&format!("Added {} to the cart", product.name));
        }
        CartAction::Remove { id } => cart.remove(&ProductId::new(id)),
        CartAction::Set { id, quantity } => cart.set_quantity(&ProductId::new(id), quantity),
        CartAction::Clear => cart.clear(),
    }

    render::cart(&cart.snapshot());
    Ok(())
}
