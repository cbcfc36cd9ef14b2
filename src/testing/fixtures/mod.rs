//! Test fixtures and data builders
//!
//! This module provides order history payloads for common scenarios.

pub mod builders;

pub use builders::OrderBuilder;

use serde_json::{json, Value};

/// Wrap orders in the page envelope
pub fn orders_page(orders: Vec<Value>) -> Value {
    json!({ "orders": orders })
}

/// A delivered order with the given raw product list
pub fn delivered_order(placed_time: &str, products: Value) -> Value {
    OrderBuilder::new()
        .placed_at(placed_time)
        .with_raw_products(products)
        .build()
}

/// An order with no status, used only to mark the previous month
pub fn boundary_order(placed_time: &str) -> Value {
    OrderBuilder::new()
        .without_status()
        .placed_at(placed_time)
        .build()
}
