//! Terminal output.
//!
//! Everything printed to stdout goes through here. Logs go to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use rust_decimal::Decimal;
use shopnow_core::Price;
use shopnow_storefront::models::{Cart, OrderSummary, Product, UserProfile};
use shopnow_storefront::services::catalog::InventoryStats;
use shopnow_storefront::services::checkout::Totals;

/// Format an amount in reais.
pub fn money(amount: Decimal) -> String {
    Price::brl(amount).display()
}

pub fn failure(message: &str) {
    eprintln!("error: {message}");
}

pub fn notice(message: &str) {
    println!("{message}");
}

/// One line per product, with the stock badge.
pub fn product_table<'a>(products: impl IntoIterator<Item = &'a Product>) {
    let mut shown = 0_usize;
    for product in products {
        println!(
            "{:<24} {:<32} {:<11} {:>14}  {} ({})",
            product.id,
            product.name,
            product.category.label(),
            money(product.price),
            product.stock_level(),
            product.stock(),
        );
        shown += 1;
    }
    if shown == 0 {
        println!("No products found.");
    }
}

pub fn product_detail(product: &Product) {
    println!("{}", product.name);
    println!("  id:        {}", product.id);
    println!("  category:  {}", product.category.label());
    println!("  price:     {}", money(product.price));
    println!("  stock:     {} ({})", product.stock_level(), product.stock());
    if let Some(image) = &product.image {
        println!("  image:     {image}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
}

pub fn cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:<24} {:<32} {:>4} x {:>12} = {:>14}",
            line.id,
            line.name,
            line.quantity,
            money(line.price),
            money(line.line_total()),
        );
    }
    println!();
    println!("Items: {}", cart.item_count());
    totals(&Totals::for_subtotal(cart.subtotal()));
}

pub fn totals(totals: &Totals) {
    println!("Subtotal: {:>14}", money(totals.subtotal));
    if totals.shipping.is_zero() {
        println!("Shipping: {:>14}", "Free");
    } else {
        println!("Shipping: {:>14}", money(totals.shipping));
    }
    println!("Total:    {:>14}", money(totals.total));
}

pub fn order(summary: &OrderSummary) {
    println!("Order placed! Number: {}", summary.order_number);
    println!();
    for line in &summary.lines {
        println!(
            "  {} x{}  {}",
            line.name,
            line.quantity,
            money(line.line_total())
        );
    }
    println!();
    totals(&Totals {
        subtotal: summary.subtotal,
        shipping: summary.shipping,
        total: summary.total,
    });
    println!();
    let customer = &summary.customer;
    println!("Ship to: {} <{}>", customer.full_name, customer.email);
    println!("         {}, {} {}", customer.address, customer.city, customer.zip_code);
    println!("         {}", customer.phone);
}

pub fn profile(profile: &UserProfile) {
    println!("email:   {}", profile.email);
    println!("name:    {}", profile.name.as_deref().unwrap_or("-"));
    println!("address: {}", profile.address.as_deref().unwrap_or("-"));
    println!("city:    {}", profile.city.as_deref().unwrap_or("-"));
    println!("phone:   {}", profile.phone.as_deref().unwrap_or("-"));
}

pub fn stats(stats: &InventoryStats) {
    println!("Products:      {}", stats.total_products);
    println!("Stock value:   {}", money(stats.stock_value));
    println!("Low stock:     {}", stats.low_stock);
    println!("Out of stock:  {}", stats.out_of_stock);
}
