//! Catalog browsing and admin CRUD.

use clap::{Args, Subcommand};
use shopnow_core::{Category, ProductId};
use shopnow_storefront::error::AppError;
use shopnow_storefront::models::ProductForm;
use shopnow_storefront::services::catalog::{self, InventoryStats};
use shopnow_storefront::state::AppState;

use crate::render;

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, optionally in one category
    List {
        /// Category slug (camisas, tenis, acessorios)
        #[arg(short, long)]
        category: Option<Category>,
    },
    /// Show the home page selection
    Featured,
    /// Show one product
    Get {
        /// Product ID
        id: String,
    },
    /// Search products by name
    Search {
        /// Text to look for (case-insensitive)
        term: String,
    },
    /// Admin product table with stock badges
    Admin {
        /// Only products whose name or category contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Inventory totals
    Stats,
    /// Create a product
    Add(ProductFields),
    /// Replace a product; omitted fields keep their current value
    Update {
        /// Product ID
        id: String,

        #[command(flatten)]
        fields: ProductUpdate,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Args)]
pub struct ProductFields {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    /// Unit price in reais; a comma decimal separator is accepted
    #[arg(long)]
    price: String,

    #[arg(long)]
    quantity: String,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

impl From<ProductFields> for ProductForm {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            category: fields.category,
            price: fields.price,
            quantity: fields.quantity,
            image: fields.image,
            description: fields.description,
        }
    }
}

#[derive(Args)]
pub struct ProductUpdate {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    price: Option<String>,

    #[arg(long)]
    quantity: Option<String>,

    #[arg(long)]
    image: Option<String>,

    #[arg(long)]
    description: Option<String>,
}

impl ProductUpdate {
    fn apply(self, form: &mut ProductForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(price) = self.price {
            form.price = price;
        }
        if let Some(quantity) = self.quantity {
            form.quantity = quantity;
        }
        if self.image.is_some() {
            form.image = self.image;
        }
        if self.description.is_some() {
            form.description = self.description;
        }
    }
}

pub async fn run(state: &AppState, action: ProductAction) -> Result<(), AppError> {
    let products = state.products();

    match action {
        ProductAction::List { category } => {
            let listed = match category {
                Some(category) => products.list_by_category(category).await?,
                None => products.list_all().await?,
            };
            render::product_table(&listed);
        }
        ProductAction::Featured => {
            let all = products.list_all().await?;
            render::product_table(&catalog::featured(all));
        }
        ProductAction::Get { id } => {
            let product = products.get(&ProductId::new(id)).await?;
            render::product_detail(&product);
        }
        ProductAction::Search { term } => {
            let found = products.search_by_name(&term).await?;
            render::product_table(&found);
        }
        ProductAction::Admin { filter } => {
            let all = products.list_all().await?;
            match filter {
                Some(term) => render::product_table(catalog::filter_admin(&all, &term)),
                None => render::product_table(&all),
            }
        }
        ProductAction::Stats => {
            let all = products.list_all().await?;
            render::stats(&InventoryStats::from_products(&all));
        }
        ProductAction::Add(fields) => {
            let data = ProductForm::from(fields).validate()?;
            let product = products.create(data).await?;
            tracing::info!(id = %product.id, "Product created");
            render::notice(&format!("Created {} ({})", product.name, product.id));
        }
        ProductAction::Update { id, fields } => {
            let id = ProductId::new(id);
            let current = products.get(&id).await?;

            let mut form = ProductForm::from_product(&current);
            fields.apply(&mut form);
            let updated = products.update(&id, form.validate()?).await?;

            tracing::info!(id = %updated.id, "Product updated");
            render::product_detail(&updated);
        }
        ProductAction::Delete { id } => {
            let id = ProductId::new(id);
            products.delete(&id).await?;
            tracing::info!(%id, "Product deleted");
            render::notice(&format!("Deleted {id}"));
        }
    }

    Ok(())
}
