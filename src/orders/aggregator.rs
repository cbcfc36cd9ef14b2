//! Per-product accumulation of in-scope orders

use super::model::{AggregatedProduct, Order, ProductLineItem};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::warn;

/// Folds line items into a map keyed by product name.
#[derive(Debug, Clone)]
pub struct Aggregator {
    cdn_prefix: String,
    products: HashMap<String, AggregatedProduct>,
    skipped_orders: usize,
}

impl Aggregator {
    pub fn new(cdn_prefix: impl Into<String>) -> Self {
        Self {
            cdn_prefix: cdn_prefix.into(),
            products: HashMap::new(),
            skipped_orders: 0,
        }
    }

    /// Fold every order, skipping the ones whose product list is unusable.
    pub fn fold<'a>(&mut self, orders: impl IntoIterator<Item = &'a Order>) {
        for order in orders {
            if let Err(e) = self.fold_order(order) {
                warn!("{}", e);
                self.skipped_orders += 1;
            }
        }
    }

    /// Fold a single order.
    ///
    /// Fails with [`Error::MalformedOrder`] when `productsNamesAndCounts` is
    /// missing or not an array; nothing is recorded in that case.
    pub fn fold_order(&mut self, order: &Order) -> Result<()> {
        let items = order.products.as_ref().ok_or_else(|| {
            Error::MalformedOrder(format!(
                "order placed at {} has no product list",
                order.placed_time.as_deref().unwrap_or("<unknown>")
            ))
        })?;
        let placed_time = order.placed_time.clone().unwrap_or_default();

        for raw in items {
            let added = ProductLineItem::from_value(raw)
                .and_then(|item| self.add_item(&item, &placed_time));
            if let Err(e) = added {
                warn!("Skipping line item {}: {}", raw, e);
            }
        }

        Ok(())
    }

    /// A line item that would overflow the running count is rejected whole.
    fn add_item(&mut self, item: &ProductLineItem, placed_time: &str) -> Result<()> {
        match self.products.get_mut(&item.name) {
            Some(product) => {
                product.count = product.count.checked_add(item.count).ok_or_else(|| {
                    Error::MalformedOrder(format!("count for {} overflows", item.name))
                })?;
                product.order_dates.push(placed_time.to_string());
            }
            None => {
                let image_url = self.image_url(item);
                self.products.insert(
                    item.name.clone(),
                    AggregatedProduct {
                        name: item.name.clone(),
                        count: item.count,
                        image_url,
                        order_dates: vec![placed_time.to_string()],
                    },
                );
            }
        }
        Ok(())
    }

    fn image_url(&self, item: &ProductLineItem) -> String {
        item.image_path()
            .map(|path| format!("{}{}", self.cdn_prefix, path))
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&AggregatedProduct> {
        self.products.get(name)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Orders dropped because their product list was unusable.
    pub fn skipped_orders(&self) -> usize {
        self.skipped_orders
    }

    pub fn total_count(&self) -> u64 {
        self.products
            .values()
            .fold(0u64, |total, p| total.saturating_add(p.count))
    }

    /// The aggregate, in no particular order.
    pub fn into_products(self) -> Vec<AggregatedProduct> {
        self.products.into_values().collect()
    }
}
