//! Test data builders for order history payloads

use serde_json::{json, Value};

/// Builder for one order object as the provider sends it
pub struct OrderBuilder {
    status: Value,
    placed_time: Value,
    products: Value,
}

impl Default for OrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self {
            status: json!("DELIVERED"),
            placed_time: Value::Null,
            products: json!([]),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = json!(status);
        self
    }

    pub fn without_status(mut self) -> Self {
        self.status = Value::Null;
        self
    }

    pub fn placed_at(mut self, placed_time: &str) -> Self {
        self.placed_time = json!(placed_time);
        self
    }

    /// Append a line item, optionally with an image path
    pub fn with_product(mut self, name: &str, count: u64, image_path: Option<&str>) -> Self {
        let mut item = json!({"name": name, "count": count});
        if let Some(path) = image_path {
            item["image"] = json!({"path": path});
        }
        if let Value::Array(items) = &mut self.products {
            items.push(item);
        } else {
            self.products = json!([item]);
        }
        self
    }

    /// Replace the product list with an arbitrary value (e.g. `null`)
    pub fn with_raw_products(mut self, products: Value) -> Self {
        self.products = products;
        self
    }

    pub fn build(self) -> Value {
        json!({
            "status": self.status,
            "placedTime": self.placed_time,
            "productsNamesAndCounts": self.products,
        })
    }
}
