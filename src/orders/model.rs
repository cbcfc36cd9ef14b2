//! Wire records of the order history API and the aggregate built from them

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ORDERS_FIELD: &str = "orders";
const STATUS_FIELD: &str = "status";
const PLACED_TIME_FIELD: &str = "placedTime";
const PRODUCTS_FIELD: &str = "productsNamesAndCounts";

/// One page of the order history, newest orders first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
}

impl OrderPage {
    /// Validate a decoded response body.
    ///
    /// Only the envelope is checked here. Individual orders are parsed
    /// leniently and bad ones are dealt with during aggregation.
    pub fn from_body(body: Option<Value>) -> Result<Self> {
        let body = body.ok_or_else(|| Error::MalformedResponse("empty body".to_string()))?;

        let orders = match body.get(ORDERS_FIELD) {
            Some(Value::Array(orders)) => orders,
            Some(_) => {
                return Err(Error::MalformedResponse(
                    "`orders` is not an array".to_string(),
                ))
            }
            None => {
                return Err(Error::MalformedResponse(
                    "missing `orders` field".to_string(),
                ))
            }
        };

        Ok(Self {
            orders: orders.iter().map(Order::from_value).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// An order as returned by the provider.
///
/// Every field is optional on the wire, so nothing here is trusted until it
/// is used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    /// `None` when the field is missing or not a string.
    pub status: Option<String>,
    /// Placement timestamp exactly as sent.
    pub placed_time: Option<String>,
    /// Raw line items. `None` when the field is missing or not an array.
    pub products: Option<Vec<Value>>,
}

impl Order {
    pub fn from_value(value: &Value) -> Self {
        Self {
            status: value
                .get(STATUS_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            placed_time: value
                .get(PLACED_TIME_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string),
            products: value.get(PRODUCTS_FIELD).and_then(Value::as_array).cloned(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("delivered"))
    }

    /// Wall-clock placement time at `offset`, if the timestamp parses.
    pub fn placed_at(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        self.placed_time
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, offset))
    }
}

/// Parse an ISO-8601 timestamp into wall-clock time at `offset`.
///
/// Date-times with an explicit offset are converted, date-times without one
/// are taken as already local, and bare dates are midnight UTC.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset).naive_local());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(
            DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc)
                .with_timezone(&offset)
                .naive_local(),
        );
    }

    None
}

/// One product entry inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLineItem {
    pub name: String,
    pub count: u64,
    #[serde(default)]
    pub image: Option<ProductImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub path: Option<String>,
}

impl ProductLineItem {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|image| image.path.as_deref())
            .filter(|path| !path.is_empty())
    }
}

/// Running total for one product across all in-scope orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedProduct {
    pub name: String,
    pub count: u64,
    /// First image seen for this product, or empty.
    pub image_url: String,
    /// One entry per contributing line item, in fold order.
    pub order_dates: Vec<String>,
}
